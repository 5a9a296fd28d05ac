use std::fmt::Write;

use super::{attr, esc, field_errors, layout};
use crate::api::flash::Flash;
use crate::api::validation::FormErrors;
use crate::constants::routes::UPLOADS_MOUNT;
use crate::models::user::User;

fn nav(current: Option<&User>) -> String {
    match current {
        Some(user) => format!(
            r#"<a href="/">Home</a><a href="/accounts">Accounts</a><a href="/profile">{}</a><a href="/logout">Logout</a>"#,
            esc(&user.username)
        ),
        None => r#"<a href="/">Home</a><a href="/register">Register</a><a href="/login">Login</a>"#
            .to_string(),
    }
}

/// Users on the shared default get a lettered placeholder; no image file backs it.
fn avatar(user: &User) -> String {
    if user.has_default_avatar() {
        let initial = user
            .username
            .chars()
            .next()
            .map(|c| c.to_uppercase().to_string())
            .unwrap_or_default();
        return format!(
            r#"<span class="avatar placeholder" title="{}">{}</span>"#,
            attr(&user.username),
            esc(&initial)
        );
    }

    format!(
        r#"<img class="avatar" src="{}/{}" alt="{}">"#,
        UPLOADS_MOUNT,
        attr(&user.profile_pic),
        attr(&user.username)
    )
}

pub fn home(current: Option<&User>, flashes: &[Flash], users: &[User]) -> String {
    let mut body = String::from("<h1>Users</h1>\n<ul>\n");
    for user in users {
        let _ = writeln!(body, "<li>{} {}</li>", avatar(user), esc(&user.username));
    }
    body.push_str("</ul>");

    layout("Home", &nav(current), flashes, &body)
}

pub fn accounts(current: &User, flashes: &[Flash], users: &[User]) -> String {
    let mut body = String::from("<h1>Accounts</h1>\n<table>\n");
    for user in users {
        let _ = writeln!(
            body,
            r#"<tr><td>{avatar}</td><td>{name}</td><td><form class="inline" method="post" action="/login_as/{id}"><button type="submit">Login as</button></form> <form class="inline" method="post" action="/delete_user/{id}"><button type="submit">Delete</button></form></td></tr>"#,
            avatar = avatar(user),
            name = esc(&user.username),
            id = user.id,
        );
    }
    body.push_str("</table>");

    layout("Accounts", &nav(Some(current)), flashes, &body)
}

pub fn register(flashes: &[Flash], username: &str, errors: &FormErrors) -> String {
    let body = format!(
        r#"<h1>Register</h1>
<form method="post" action="/register">
<p><label>Username <input name="username" value="{username}" required minlength="4" maxlength="150"></label>{username_errors}</p>
<p><label>Password <input type="password" name="password" required minlength="6"></label>{password_errors}</p>
<p><button type="submit">Register</button></p>
</form>"#,
        username = attr(username),
        username_errors = field_errors(errors, "username"),
        password_errors = field_errors(errors, "password"),
    );

    layout("Register", &nav(None), flashes, &body)
}

pub fn login(
    current: Option<&User>,
    flashes: &[Flash],
    username: &str,
    next: Option<&str>,
    errors: &FormErrors,
) -> String {
    let next_field = next.map_or_else(String::new, |n| {
        format!(r#"<input type="hidden" name="next" value="{}">"#, attr(n))
    });

    let body = format!(
        r#"<h1>Login</h1>
<form method="post" action="/login">
{next_field}
<p><label>Username <input name="username" value="{username}" required></label>{username_errors}</p>
<p><label>Password <input type="password" name="password" required></label>{password_errors}</p>
<p><button type="submit">Login</button></p>
</form>"#,
        username = attr(username),
        username_errors = field_errors(errors, "username"),
        password_errors = field_errors(errors, "password"),
    );

    layout("Login", &nav(current), flashes, &body)
}

pub fn profile(user: &User, flashes: &[Flash], username: &str, errors: &FormErrors) -> String {
    let body = format!(
        r#"<h1>Profile</h1>
<p>{avatar} <strong>{name}</strong></p>
<form method="post" action="/profile" enctype="multipart/form-data">
<p><label>Username <input name="username" value="{username}" required minlength="4" maxlength="150"></label>{username_errors}</p>
<p><label>Update Profile Picture <input type="file" name="profile_pic" accept=".jpg,.png"></label>{pic_errors}</p>
<p><button type="submit">Update</button></p>
</form>
<form method="post" action="/delete_account">
<p><button type="submit">Delete Account</button></p>
</form>"#,
        avatar = avatar(user),
        name = esc(&user.username),
        username = attr(username),
        username_errors = field_errors(errors, "username"),
        pic_errors = field_errors(errors, "profile_pic"),
    );

    layout("Profile", &nav(Some(user)), flashes, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::DEFAULT_AVATAR;

    fn user(profile_pic: &str) -> User {
        User {
            id: 7,
            username: "alice".to_string(),
            profile_pic: profile_pic.to_string(),
        }
    }

    #[test]
    fn test_default_avatar_renders_placeholder() {
        let html = avatar(&user(DEFAULT_AVATAR));
        assert!(!html.contains("<img"));
        assert!(html.contains(r#"class="avatar placeholder""#));
        assert!(html.contains(">A</span>"));
    }

    #[test]
    fn test_uploaded_avatar_links_file() {
        let html = avatar(&user("7.png"));
        assert!(html.contains(r#"src="/static/uploads/7.png""#));
    }
}
