//! Server-rendered HTML pages.
//!
//! Every user-supplied value goes through [`escape_html`] before it reaches
//! markup.

use contact_core::{Contact, ContactCommand, ContactField, ContactListView, FieldError};
use std::fmt::Write;

/// Which contact form is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormMode {
    Add,
    Edit,
}

impl FormMode {
    fn title(self) -> &'static str {
        match self {
            Self::Add => "Add Contact",
            Self::Edit => "Edit Contact",
        }
    }

    fn action(self) -> &'static str {
        match self {
            Self::Add => "/contact",
            Self::Edit => "/contact?_method=PUT",
        }
    }

    fn submit_label(self) -> &'static str {
        match self {
            Self::Add => "Add",
            Self::Edit => "Save",
        }
    }
}

pub fn escape_html(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Percent-encodes one path segment.
pub fn encode_path_segment(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~') {
            encoded.push(char::from(byte));
        } else {
            let _ = write!(encoded, "%{byte:02X}");
        }
    }
    encoded
}

pub fn home_page() -> String {
    layout(
        "Home",
        "<h1>Contact Book</h1>\
         <p>Keep names, emails and phone numbers in one place.</p>\
         <p><a href=\"/contact\">Open contacts</a></p>",
    )
}

pub fn about_page() -> String {
    layout(
        "About",
        &format!(
            "<h1>About</h1><p>Contact Book version {}.</p>",
            escape_html(contact_core::core_version())
        ),
    )
}

pub fn contact_list_page(view: &ContactListView) -> String {
    let mut body = String::from("<h1>Contacts</h1>");
    for message in &view.success {
        let _ = write!(
            body,
            "<div class=\"alert alert-success\" role=\"alert\">{}</div>",
            escape_html(message)
        );
    }
    for message in &view.errors {
        let _ = write!(
            body,
            "<div class=\"alert alert-danger\" role=\"alert\">{}</div>",
            escape_html(message)
        );
    }
    body.push_str("<p><a href=\"/contact/add\">Add contact</a></p>");

    if view.contacts.is_empty() {
        body.push_str("<p class=\"empty\">No contacts yet.</p>");
        return layout("Contact", &body);
    }

    body.push_str("<table><thead><tr><th>#</th><th>Name</th><th>Phone</th><th></th></tr></thead><tbody>");
    for (index, contact) in view.contacts.iter().enumerate() {
        let _ = write!(
            body,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td><a href=\"/contact/{}\">Detail</a></td></tr>",
            index + 1,
            escape_html(&contact.name),
            escape_html(&contact.phone),
            encode_path_segment(&contact.name)
        );
    }
    body.push_str("</tbody></table>");
    layout("Contact", &body)
}

/// Renders the add/edit form, refilled with `values` and annotated with `errors`.
pub fn contact_form_page(mode: FormMode, values: &ContactCommand, errors: &[FieldError]) -> String {
    let mut body = format!("<h1>{}</h1>", mode.title());
    if !errors.is_empty() {
        body.push_str("<ul class=\"errors\">");
        for error in errors {
            let _ = write!(
                body,
                "<li data-field=\"{}\">{}</li>",
                error.field,
                escape_html(&error.message)
            );
        }
        body.push_str("</ul>");
    }

    let _ = write!(body, "<form method=\"post\" action=\"{}\">", mode.action());
    if mode == FormMode::Edit {
        let _ = write!(
            body,
            "<input type=\"hidden\" name=\"_id\" value=\"{}\">\
             <input type=\"hidden\" name=\"oldName\" value=\"{}\">",
            escape_html(values.id.as_deref().unwrap_or_default()),
            escape_html(values.old_name.as_deref().unwrap_or(values.name.as_str()))
        );
    }
    for (field, label, input_type, value) in [
        (ContactField::Name, "Name", "text", &values.name),
        (ContactField::Email, "Email", "email", &values.email),
        (ContactField::Phone, "Phone", "text", &values.phone),
    ] {
        let _ = write!(
            body,
            "<label for=\"{field}\">{label}</label>\
             <input id=\"{field}\" type=\"{input_type}\" name=\"{field}\" value=\"{}\" required>",
            escape_html(value)
        );
    }
    let _ = write!(
        body,
        "<button type=\"submit\">{}</button></form><p><a href=\"/contact\">Back</a></p>",
        mode.submit_label()
    );
    layout(mode.title(), &body)
}

pub fn contact_detail_page(contact: &Contact) -> String {
    let name = escape_html(&contact.name);
    let body = format!(
        "<h1>{name}</h1>\
         <dl><dt>Email</dt><dd>{email}</dd><dt>Phone</dt><dd>{phone}</dd></dl>\
         <p><a href=\"/contact/edit/{path}\">Edit</a></p>\
         <form method=\"post\" action=\"/contact?_method=DELETE\">\
         <input type=\"hidden\" name=\"_id\" value=\"{id}\">\
         <input type=\"hidden\" name=\"name\" value=\"{name}\">\
         <button type=\"submit\">Delete</button></form>\
         <p><a href=\"/contact\">Back</a></p>",
        email = escape_html(&contact.email),
        phone = escape_html(&contact.phone),
        path = encode_path_segment(&contact.name),
        id = contact.id,
    );
    layout("Detail", &body)
}

pub fn not_found_page(name: &str) -> String {
    layout(
        "Not Found",
        &format!(
            "<h1>Contact not found</h1><p>No contact named <strong>{}</strong>.</p>\
             <p><a href=\"/contact\">Back</a></p>",
            escape_html(name)
        ),
    )
}

pub fn error_page(message: &str) -> String {
    layout(
        "Error",
        &format!("<h1>Something went wrong</h1><p>{}</p>", escape_html(message)),
    )
}

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <title>{}</title></head><body>\
         <nav><a href=\"/\">Home</a> <a href=\"/about\">About</a> <a href=\"/contact\">Contact</a></nav>\
         <main>{body}</main></body></html>",
        escape_html(title)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn escape_html_neutralizes_markup() {
        assert_eq!(
            escape_html("<b>\"Tom\" & 'Jerry'</b>"),
            "&lt;b&gt;&quot;Tom&quot; &amp; &#39;Jerry&#39;&lt;/b&gt;"
        );
    }

    #[test]
    fn path_segments_are_percent_encoded() {
        assert_eq!(encode_path_segment("Jaka Tarub"), "Jaka%20Tarub");
        assert_eq!(encode_path_segment("a/b?c"), "a%2Fb%3Fc");
    }

    #[test]
    fn edit_form_keeps_submitted_values_and_lists_errors() {
        let values = ContactCommand::edit(Uuid::new_v4(), "Old", "<New>", "bad", "123");
        let errors = vec![FieldError::new(ContactField::Email, "Invalid email!")];
        let html = contact_form_page(FormMode::Edit, &values, &errors);

        assert!(html.contains("value=\"&lt;New&gt;\""));
        assert!(html.contains("name=\"oldName\" value=\"Old\""));
        assert!(html.contains("data-field=\"email\">Invalid email!"));
        assert!(html.contains("action=\"/contact?_method=PUT\""));
    }
}
