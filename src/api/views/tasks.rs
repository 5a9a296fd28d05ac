use std::fmt::Write;

use super::{attr, esc, layout};
use crate::models::task::Task;

pub fn index(tasks: &[Task]) -> String {
    let mut body = String::from(
        r#"<h1>To-Do</h1>
<form method="post" action="/add">
<input name="task" placeholder="New task" required>
<button type="submit">Add</button>
</form>
<ul>
"#,
    );

    for task in tasks {
        let text = if task.done {
            format!(r#"<span class="done">{}</span>"#, esc(&task.text))
        } else {
            format!(
                r#"<span>{}</span> <a href="/complete/{}">Complete</a>"#,
                esc(&task.text),
                task.id
            )
        };

        let _ = writeln!(
            body,
            r#"<li data-id="{id}" data-done="{done}">{text} <a href="/delete/{id}">Delete</a>
<form class="inline" method="post" action="/edit/{id}"><input name="task" value="{value}" required><button type="submit">Edit</button></form></li>"#,
            id = task.id,
            done = task.done,
            value = attr(&task.text),
        );
    }
    body.push_str("</ul>");

    layout("To-Do", r#"<a href="/">Tasks</a>"#, &[], &body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_marks_done_tasks() {
        let tasks = vec![
            Task {
                id: 1,
                text: "buy milk".to_string(),
                done: true,
            },
            Task {
                id: 2,
                text: "<script>".to_string(),
                done: false,
            },
        ];

        let html = index(&tasks);
        assert!(html.contains(r#"data-id="1" data-done="true""#));
        assert!(html.contains(r#"<span class="done">buy milk</span>"#));
        assert!(!html.contains("/complete/1"));
        assert!(html.contains("/complete/2"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }
}
