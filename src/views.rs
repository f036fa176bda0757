use crate::models::{Announcement, AnnouncementPage, Pagination};

const STYLE: &str = r#"
  body { font-family: -apple-system, 'Segoe UI', sans-serif; background: #f5f5f5; margin: 0; padding: 20px; }
  .container { max-width: 800px; margin: 0 auto; }
  h1 { color: #4CAF50; }
  .announcement { background: #fff; border-radius: 8px; padding: 20px; margin-bottom: 20px; box-shadow: 0 1px 3px rgba(0,0,0,0.1); }
  .announcement h2 { color: #333; margin-top: 0; }
  .announcement p { color: #666; line-height: 1.6; }
  .empty { color: #999; text-align: center; padding: 40px 0; }
  .pagination a, .pagination span { display: inline-block; padding: 6px 12px; margin: 0 2px; border-radius: 4px; }
  .pagination a { color: #4CAF50; text-decoration: none; border: 1px solid #ddd; }
  .pagination .current { background: #4CAF50; color: #fff; }
  .admin-actions button { border: none; color: #fff; padding: 8px 12px; border-radius: 4px; cursor: pointer; }
  .edit { background: #2196F3; }
  .delete { background: #f44336; }
  form.editor { background: #fff; border-radius: 8px; padding: 20px; margin-bottom: 20px; }
  form.editor input, form.editor textarea { width: 100%; padding: 8px; margin: 6px 0; box-sizing: border-box; }
  .toolbar { display: flex; justify-content: space-between; align-items: center; }
"#;

/// login_page
///
/// The password challenge. The form posts back to the current URL, which the guard
/// intercepts whatever protected page was requested.
pub fn login_page(error: bool) -> String {
    let error_html = if error {
        r#"<div class="error">Incorrect password, please try again</div>"#
    } else {
        ""
    };
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Announcements - Login</title>
  <style>
    body {{ font-family: -apple-system, 'Segoe UI', sans-serif; display: flex; justify-content: center; align-items: center; height: 100vh; margin: 0; }}
    .login-container {{ width: 300px; padding: 20px; border-radius: 5px; box-shadow: 0 0 10px rgba(0, 0, 0, 0.1); }}
    h1 {{ color: #4CAF50; text-align: center; }}
    input[type="password"] {{ width: 100%; padding: 10px; margin: 10px 0; border: 1px solid #ddd; border-radius: 4px; box-sizing: border-box; }}
    button {{ width: 100%; padding: 10px; background-color: #4CAF50; color: white; border: none; border-radius: 4px; cursor: pointer; }}
    .error {{ color: red; text-align: center; margin-top: 10px; }}
  </style>
</head>
<body>
  <div class="login-container">
    <h1>Announcements</h1>
    <form method="post" action="" enctype="application/x-www-form-urlencoded">
      <input type="password" name="password" placeholder="Password" required>
      <button type="submit">Log in</button>
      {error_html}
    </form>
  </div>
</body>
</html>"#
    )
}

/// BoardView
///
/// Everything the list and admin pages need besides the announcements themselves.
pub struct BoardView<'a> {
    pub title: &'a str,
    pub base_path: &'a str,
    pub admin: bool,
    /// Embedded into the admin script so the browser can call the JSON API.
    pub api_token: Option<&'a str>,
}

/// board_page
///
/// Renders one page of announcements. The admin variant adds create/edit/delete controls
/// driven by the JSON API.
pub fn board_page(view: &BoardView<'_>, page: &AnnouncementPage) -> String {
    let items = if page.announcements.is_empty() {
        r#"<div class="empty">No announcements yet</div>"#.to_string()
    } else {
        page.announcements
            .iter()
            .map(|announcement| announcement_card(announcement, view.admin))
            .collect::<Vec<_>>()
            .join("\n")
    };

    let pagination = pagination_links(&page.pagination);
    let title = escape_html(view.title);
    let admin_panel = if view.admin { admin_panel(view) } else { String::new() };
    // Only the read-only feed refreshes itself; the admin view would lose unsaved edits.
    let refresh = if view.admin { "" } else { AUTO_REFRESH };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>{title}</title>
  <style>{STYLE}</style>
</head>
<body>
  <div class="container">
    <div class="toolbar">
      <h1>{title}</h1>
      <a href="{logout}">Log out</a>
    </div>
    {admin_panel}
    {items}
    {pagination}
  </div>
  {refresh}
</body>
</html>"#,
        logout = escape_html(&format!("{}/logout", view.base_path)),
    )
}

/// Reloads the page every minute. `_cb` defeats intermediate caches and is ignored by
/// the page query.
const AUTO_REFRESH: &str = r#"<script>
    setTimeout(function () {
      const url = new URL(window.location.href);
      url.searchParams.set('_cb', Date.now());
      window.location.replace(url.toString());
    }, 60000);
  </script>"#;

/// load_error_page
///
/// Shown instead of the board when the store could not be listed.
pub fn load_error_page(message: &str, base_path: &str) -> String {
    let retry = if base_path.is_empty() { "/" } else { base_path };
    format!(
        r#"<html><body><h1>Failed to load announcements</h1><p>Error: {}</p><p><a href="{}">Retry</a></p></body></html>"#,
        escape_html(message),
        escape_html(retry),
    )
}

fn announcement_card(announcement: &Announcement, admin: bool) -> String {
    let title = if announcement.title.is_empty() {
        "Untitled".to_string()
    } else {
        escape_html(&announcement.title)
    };
    let content = escape_html(&announcement.content).replace('\n', "<br>");
    let id = escape_html(&announcement.id);

    let actions = if admin && !announcement.id.is_empty() {
        format!(
            r#"<div class="admin-actions">
          <button class="edit" data-id="{id}" onclick="editAnnouncement(this.dataset.id)">Edit</button>
          <button class="delete" data-id="{id}" onclick="deleteAnnouncement(this.dataset.id)">Delete</button>
        </div>"#
        )
    } else {
        String::new()
    };

    format!(
        r#"<div class="announcement">
        <h2>{title}</h2>
        <p>{content}</p>
        {actions}
      </div>"#
    )
}

/// pagination_links
///
/// Previous / numbered / next links; nothing at all for a single page.
pub fn pagination_links(pagination: &Pagination) -> String {
    if pagination.total_pages <= 1 {
        return String::new();
    }

    let mut html = String::from(r#"<div class="pagination">"#);
    if pagination.current_page > 1 {
        html.push_str(&format!(
            r#"<a href="?page={}">Previous</a>"#,
            pagination.current_page - 1
        ));
    }
    for page in 1..=pagination.total_pages {
        if page == pagination.current_page {
            html.push_str(&format!(r#"<span class="current">{}</span>"#, page));
        } else {
            html.push_str(&format!(r#"<a href="?page={}">{}</a>"#, page, page));
        }
    }
    if pagination.current_page < pagination.total_pages {
        html.push_str(&format!(
            r#"<a href="?page={}">Next</a>"#,
            pagination.current_page + 1
        ));
    }
    html.push_str("</div>");
    html
}

fn admin_panel(view: &BoardView<'_>) -> String {
    let base_path = script_string(view.base_path);
    let api_token = script_string(view.api_token.unwrap_or(""));

    format!(
        r#"<form class="editor" id="add-form" onsubmit="saveAnnouncement(event)">
      <h3 id="form-title">New announcement</h3>
      <input type="hidden" id="edit-id">
      <input type="text" id="custom-id" placeholder="Custom ID (optional)">
      <input type="text" id="title" placeholder="Title" required>
      <textarea id="content" rows="5" placeholder="Content" required></textarea>
      <button type="submit">Save</button>
      <button type="button" onclick="resetForm()">Cancel</button>
    </form>
    <script>
      const basePath = {base_path};
      const apiToken = {api_token};
      const apiHeaders = {{ 'Content-Type': 'application/json', 'Authorization': 'Bearer ' + apiToken }};

      function resetForm() {{
        document.getElementById('add-form').reset();
        document.getElementById('edit-id').value = '';
        document.getElementById('custom-id').disabled = false;
        document.getElementById('form-title').textContent = 'New announcement';
      }}

      async function reportFailure(response) {{
        const body = await response.json().catch(() => ({{}}));
        alert(body.error || ('Request failed: ' + response.status));
      }}

      async function saveAnnouncement(event) {{
        event.preventDefault();
        const editId = document.getElementById('edit-id').value;
        const payload = {{
          title: document.getElementById('title').value,
          content: document.getElementById('content').value
        }};
        const customId = document.getElementById('custom-id').value.trim();
        if (!editId && customId) payload.id = customId;
        const url = basePath + '/api/announcements' + (editId ? '/' + encodeURIComponent(editId) : '');
        const response = await fetch(url, {{
          method: editId ? 'PUT' : 'POST',
          headers: apiHeaders,
          body: JSON.stringify(payload),
          cache: 'no-store'
        }});
        if (response.ok) {{ location.reload(); }} else {{ await reportFailure(response); }}
      }}

      async function editAnnouncement(id) {{
        const response = await fetch(basePath + '/api/announcements/' + encodeURIComponent(id), {{
          headers: apiHeaders,
          cache: 'no-store'
        }});
        if (!response.ok) {{ await reportFailure(response); return; }}
        const announcement = await response.json();
        document.getElementById('edit-id').value = announcement.id;
        document.getElementById('custom-id').value = announcement.id;
        document.getElementById('custom-id').disabled = true;
        document.getElementById('title').value = announcement.title;
        document.getElementById('content').value = announcement.content;
        document.getElementById('form-title').textContent = 'Edit announcement';
        window.scrollTo(0, 0);
      }}

      async function deleteAnnouncement(id) {{
        if (!confirm('Delete this announcement?')) return;
        const response = await fetch(basePath + '/api/announcements/' + encodeURIComponent(id), {{
          method: 'DELETE',
          headers: apiHeaders,
          cache: 'no-store'
        }});
        if (response.ok) {{ location.reload(); }} else {{ await reportFailure(response); }}
      }}
    </script>"#
    )
}

/// escape_html
///
/// Escapes the five HTML-significant characters in user-supplied text.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
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

// JSON string literal that is also safe inside a <script> element.
fn script_string(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace("</", "<\\/")
}
