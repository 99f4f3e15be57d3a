//! Directory listing page

use std::io;
use std::path::Path;
use tokio::fs;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    /// Target is a directory (symlinks followed)
    pub is_dir: bool,
    pub is_symlink: bool,
}

impl ListingEntry {
    fn display_name(&self) -> String {
        if self.is_symlink {
            format!("{}@", self.name)
        } else if self.is_dir {
            format!("{}/", self.name)
        } else {
            self.name.clone()
        }
    }

    fn href(&self) -> String {
        let mut href = urlencoding::encode(&self.name).into_owned();
        if self.is_dir {
            href.push('/');
        }
        href
    }
}

/// Read `dir` and render its listing. `display_path` is the decoded request path.
pub async fn render_listing(dir: &Path, display_path: &str) -> io::Result<String> {
    let mut entries = Vec::new();
    let mut read_dir = fs::read_dir(dir).await?;
    while let Some(entry) = read_dir.next_entry().await? {
        let is_symlink = entry
            .file_type()
            .await
            .is_ok_and(|file_type| file_type.is_symlink());
        let is_dir = fs::metadata(entry.path())
            .await
            .is_ok_and(|metadata| metadata.is_dir());
        entries.push(ListingEntry {
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir,
            is_symlink,
        });
    }

    entries.sort_by(|a, b| {
        a.name
            .to_lowercase()
            .cmp(&b.name.to_lowercase())
            .then_with(|| a.name.cmp(&b.name))
    });

    Ok(render_page(display_path, &entries))
}

/// Render the HTML page for already collected entries
pub fn render_page(display_path: &str, entries: &[ListingEntry]) -> String {
    let title = format!("Directory listing for {}", escape_html(display_path));

    let mut html = String::from("<!DOCTYPE HTML>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{title}</title>\n</head>\n<body>\n"));
    html.push_str(&format!("<h1>{title}</h1>\n<hr>\n<ul>\n"));
    for entry in entries {
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            entry.href(),
            escape_html(&entry.display_name())
        ));
    }
    html.push_str("</ul>\n<hr>\n</body>\n</html>\n");
    html
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
