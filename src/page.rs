//! The browse page served on each root's view prefix.

use std::fmt::Write;

use crate::catalog::FileEntry;
use crate::roots::NamedRoot;
use crate::upload::FILE_FIELD;

const STYLE: &str = r#"
      body { background-color: black; color: white; font-family: sans-serif; }
      a { color: #2c87f0; }
      a:visited { color: #636; }
      a:hover, a:active, a:focus { color: #c33; }
      #drophere { border: 2px dashed #ccc; border-radius: 20px; width: 480px; margin: 60px auto; padding: 20px; }
      #drophere.highlight { background-color: grey; }
      table.center { margin-left: auto; margin-right: auto; }
      th, td { padding: 10px; border: solid 1px; text-align: center; }
      .wide { width: 300px; }
"#;

// Drag and drop posts each dropped file to the form's action, then reloads.
const SCRIPT: &str = r#"
      const drophere = document.getElementById('drophere');
      if (drophere) {
        const form = drophere.querySelector('form');
        ['dragenter', 'dragover', 'dragleave', 'drop'].forEach(name =>
          drophere.addEventListener(name, e => { e.preventDefault(); e.stopPropagation(); }));
        ['dragenter', 'dragover'].forEach(name =>
          drophere.addEventListener(name, () => drophere.classList.add('highlight')));
        ['dragleave', 'drop'].forEach(name =>
          drophere.addEventListener(name, () => drophere.classList.remove('highlight')));
        drophere.addEventListener('drop', e => {
          const field = form.querySelector('input[type=file]').name;
          Promise.all([...e.dataTransfer.files].map(file => {
            const data = new FormData();
            data.append(field, file);
            return fetch(form.action, { method: 'POST', body: data });
          })).finally(() => location.reload());
        });
      }
"#;

/// Render the HTML page for `root`.
pub fn render(
    root: &NamedRoot,
    entries: &[FileEntry],
    uploads_enabled: bool,
    downloads_enabled: bool,
) -> String {
    let title = escape(&root.name);
    let mut html = String::with_capacity(4096);

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n  <head>\n");
    html.push_str("    <meta charset=\"utf-8\" />\n");
    html.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\" />\n",
    );
    let _ = writeln!(html, "    <style>{}</style>", STYLE);
    let _ = writeln!(html, "    <title>{}</title>\n  </head>\n  <body>", title);
    let _ = writeln!(html, "    <h1>{}</h1>", title);

    if uploads_enabled {
        let _ = writeln!(
            html,
            concat!(
                "    <div id=\"drophere\">\n",
                "      <form enctype=\"multipart/form-data\" action=\"{}\" method=\"post\">\n",
                "        <input type=\"file\" name=\"{}\"/>\n",
                "        <input type=\"submit\" value=\"upload\"/>\n",
                "      </form>\n",
                "    </div>"
            ),
            escape(&root.upload_prefix()),
            FILE_FIELD
        );
    }

    if downloads_enabled && !entries.is_empty() {
        html.push_str("    <table class=\"center\">\n");
        html.push_str("      <tr><th>Name</th><th>Size</th><th>Modified</th></tr>\n");
        for entry in entries {
            let _ = writeln!(
                html,
                "      <tr><td class=\"wide\"><a href=\"{}\">{}</a></td><td>{}</td><td>{}</td></tr>",
                escape(&entry.web_path),
                escape(&entry.relative_path),
                escape(&entry.size_human),
                escape(&entry.modified_at)
            );
        }
        html.push_str("    </table>\n");
    }

    let _ = writeln!(html, "    <script>{}</script>\n  </body>\n</html>", SCRIPT);
    html
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
