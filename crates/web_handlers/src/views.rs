use std::fmt::Write;

use actix_web::http::StatusCode;
use auth_services::session::Flash;
use auth_services::types::Account;
use listing_services::types::{Campground, CampgroundDetails, CampgroundForm, MAX_RATING};

/// Escapes text for use in HTML element content and quoted attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Wraps a page body in the shared layout: navigation bar and flash notices.
pub fn layout(title: &str, user: Option<&Account>, flash: &Flash, body: &str) -> String {
    let account_links = match user {
        Some(account) => format!(
            r#"<span class="nav-user">Signed in as {}</span>
        <a href="/logout">Logout</a>"#,
            escape_html(&account.username)
        ),
        None => r#"<a href="/login">Login</a>
        <a href="/register">Register</a>"#
            .to_string(),
    };

    let mut notices = String::new();
    for message in &flash.success {
        let _ = write!(
            notices,
            r#"<div class="alert alert-success" role="alert">{}</div>"#,
            escape_html(message)
        );
    }
    for message in &flash.error {
        let _ = write!(
            notices,
            r#"<div class="alert alert-danger" role="alert">{}</div>"#,
            escape_html(message)
        );
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{title} | YelpCamp</title>
    <link rel="stylesheet" href="/public/stylesheets/app.css">
</head>
<body>
    <nav>
        <a class="brand" href="/campgrounds">YelpCamp</a>
        <a href="/campgrounds">Campgrounds</a>
        <a href="/campgrounds/new">New Campground</a>
        {account_links}
    </nav>
    <main>
        {notices}
        {body}
    </main>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

/// Registration form.
pub fn register_page() -> String {
    r#"<h1>Register</h1>
<form action="/adduser" method="POST">
    <label for="username">Username</label>
    <input type="text" id="username" name="username" required>
    <label for="email">Email</label>
    <input type="email" id="email" name="email" required>
    <label for="password">Password</label>
    <input type="password" id="password" name="password" required>
    <button>Register</button>
</form>"#
        .to_string()
}

/// Login form.
pub fn login_page() -> String {
    r#"<h1>Login</h1>
<form action="/loggedin" method="POST">
    <label for="username">Username</label>
    <input type="text" id="username" name="username" required>
    <label for="password">Password</label>
    <input type="password" id="password" name="password" required>
    <button>Login</button>
</form>"#
        .to_string()
}

/// List of every campground.
pub fn index_page(campgrounds: &[Campground]) -> String {
    let mut body = String::from("<h1>All Campgrounds</h1>\n");

    if campgrounds.is_empty() {
        body.push_str(r#"<p class="empty">No campgrounds yet.</p>"#);
    }

    for campground in campgrounds {
        let _ = write!(
            body,
            r#"<div class="card">
    {image}
    <h2>{title}</h2>
    <p>{description}</p>
    <p class="location">{location}</p>
    <a href="/campgrounds/{id}">View {title}</a>
</div>
"#,
            image = image_tag(campground),
            title = escape_html(&campground.title),
            description = escape_html(&campground.description),
            location = escape_html(&campground.location),
            id = campground.id,
        );
    }

    body
}

/// Creation form.
pub fn new_page() -> String {
    format!(
        r#"<h1>New Campground</h1>
<form action="/campgrounds" method="POST">
{fields}
    <button>Add Campground</button>
</form>"#,
        fields = campground_fields(&CampgroundForm::default()),
    )
}

/// Edit form, prefilled with the campground's current values.
pub fn edit_page(campground: &Campground) -> String {
    format!(
        r#"<h1>Edit Campground</h1>
<form action="/campgrounds/{id}?_method=PUT" method="POST">
{fields}
    <button>Update Campground</button>
</form>
<a href="/campgrounds/{id}">Back to Campground</a>"#,
        id = campground.id,
        fields = campground_fields(&CampgroundForm::from(campground)),
    )
}

/// Detail page. Author controls only show for the author; the review form only
/// shows for signed-in visitors.
pub fn show_page(details: &CampgroundDetails, user: Option<&Account>) -> String {
    let campground = &details.campground;
    let is_author = user.is_some_and(|account| account.id == campground.author_id);

    let author = details
        .author
        .as_ref()
        .map(|account| escape_html(&account.username))
        .unwrap_or_else(|| "unknown".to_string());

    let mut body = format!(
        r#"<div class="card">
    {image}
    <h1>{title}</h1>
    <p>{description}</p>
    <p class="location">{location}</p>
    <p class="author">Submitted by {author}</p>
    <p class="price">${price:.2}/night</p>
"#,
        image = image_tag(campground),
        title = escape_html(&campground.title),
        description = escape_html(&campground.description),
        location = escape_html(&campground.location),
        price = campground.price,
    );

    if is_author {
        let _ = write!(
            body,
            r#"    <a href="/campgrounds/{id}/edit">Edit</a>
    <form class="inline" action="/campgrounds/{id}?_method=DELETE" method="POST">
        <button>Delete</button>
    </form>
"#,
            id = campground.id,
        );
    }
    body.push_str("</div>\n");

    if user.is_some() {
        let _ = write!(
            body,
            r#"<h2>Leave a Review</h2>
<form action="/campgrounds/{id}/reviews" method="POST">
    <label for="rating">Rating</label>
    <input type="range" id="rating" name="rating" min="1" max="{max}" value="{max}">
    <label for="body">Review</label>
    <textarea id="body" name="body" required></textarea>
    <button>Submit</button>
</form>
"#,
            id = campground.id,
            max = MAX_RATING,
        );
    }

    let _ = write!(
        body,
        r#"<h2>Reviews ({})</h2>
"#,
        details.reviews.len()
    );
    for review in &details.reviews {
        let _ = write!(
            body,
            r#"<div class="review">
    <p class="rating">Rating: {rating}/{max}</p>
    <p>{text}</p>
"#,
            rating = review.rating,
            max = MAX_RATING,
            text = escape_html(&review.body),
        );
        if is_author {
            let _ = write!(
                body,
                r#"    <form class="inline" action="/campgrounds/{cid}/reviews/{rid}?_method=DELETE" method="POST">
        <button>Delete</button>
    </form>
"#,
                cid = campground.id,
                rid = review.id,
            );
        }
        body.push_str("</div>\n");
    }

    body.push_str(r#"<a href="/campgrounds">All Campgrounds</a>"#);
    body
}

/// Error page body for the given status.
pub fn error_page(status: StatusCode, message: &str) -> String {
    format!(
        r#"<h1>{code}</h1>
<p class="error">{message}</p>
<a href="/campgrounds">Back to Campgrounds</a>"#,
        code = status.as_u16(),
        message = escape_html(message),
    )
}

fn image_tag(campground: &Campground) -> String {
    if campground.image.is_empty() {
        String::new()
    } else {
        format!(
            r#"<img src="{}" alt="{}">"#,
            escape_html(&campground.image),
            escape_html(&campground.title)
        )
    }
}

fn campground_fields(form: &CampgroundForm) -> String {
    format!(
        r#"    <label for="title">Title</label>
    <input type="text" id="title" name="title" value="{title}" required>
    <label for="location">Location</label>
    <input type="text" id="location" name="location" value="{location}" required>
    <label for="image">Image URL</label>
    <input type="url" id="image" name="image" value="{image}">
    <label for="price">Price</label>
    <input type="text" id="price" name="price" value="{price}" inputmode="decimal" required>
    <label for="description">Description</label>
    <textarea id="description" name="description">{description}</textarea>"#,
        title = escape_html(&form.title),
        location = escape_html(&form.location),
        image = escape_html(&form.image),
        price = escape_html(&form.price),
        description = escape_html(&form.description),
    )
}
