//! Method documentation rendered to one Markdown or HTML file per version.
//!
//! Descriptions accept a tiny inline markup: `{b}bold{/b}` and `{i}italic{/i}`.

use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum DocsError {
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unknown docs format: {0}")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocsFormat {
    Markdown,
    Html,
}

impl DocsFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Html => "html",
        }
    }
}

impl FromStr for DocsFormat {
    type Err = DocsError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            other => Err(DocsError::UnknownFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamDoc {
    pub name: String,
    pub ty: String,
    pub description: String,
}

impl ParamDoc {
    pub fn new(
        name: impl Into<String>,
        ty: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            ty: ty.into(),
            description: description.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Example {
    pub lang: String,
    pub code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MethodDoc {
    pub description: String,
    pub params: Vec<ParamDoc>,
    pub example: Option<Example>,
}

impl MethodDoc {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    pub fn param(mut self, param: ParamDoc) -> Self {
        self.params.push(param);
        self
    }

    pub fn example(mut self, lang: impl Into<String>, code: impl Into<String>) -> Self {
        self.example = Some(Example {
            lang: lang.into(),
            code: code.into(),
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDoc {
    pub version: String,
    pub file_name: String,
    pub contents: String,
}

type VersionDocs = Vec<(String, MethodDoc)>;

/// Documentation catalog, kept in registration order.
#[derive(Debug, Default)]
pub struct ApiDocs {
    versions: Vec<(String, VersionDocs)>,
}

impl ApiDocs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds docs for `(version, name)`. A repeated name keeps its position
    /// and takes the new content.
    pub fn add_docs(&mut self, version: impl Into<String>, name: impl Into<String>, doc: MethodDoc) {
        let version = version.into();
        let name = name.into();

        let methods = match self.versions.iter().position(|(tag, _)| *tag == version) {
            Some(index) => &mut self.versions[index].1,
            None => {
                self.versions.push((version, Vec::new()));
                let last = self.versions.len() - 1;
                &mut self.versions[last].1
            }
        };

        match methods.iter_mut().find(|(existing, _)| *existing == name) {
            Some(entry) => entry.1 = doc,
            None => methods.push((name, doc)),
        }
    }

    pub fn get(&self, version: &str, name: &str) -> Option<&MethodDoc> {
        self.versions
            .iter()
            .find(|(tag, _)| tag == version)?
            .1
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, doc)| doc)
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    pub fn render(&self, format: DocsFormat) -> Vec<RenderedDoc> {
        self.versions
            .iter()
            .map(|(version, methods)| RenderedDoc {
                version: version.clone(),
                file_name: format!("docs{version}.{}", format.extension()),
                contents: match format {
                    DocsFormat::Markdown => render_markdown(version, methods),
                    DocsFormat::Html => render_html(version, methods),
                },
            })
            .collect()
    }

    /// Writes every rendered version into `dir`, returning the written paths.
    pub fn write_all(&self, dir: &Path, format: DocsFormat) -> Result<Vec<PathBuf>, DocsError> {
        fs::create_dir_all(dir).map_err(|source| DocsError::Write {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut written = Vec::new();
        for doc in self.render(format) {
            let path = dir.join(&doc.file_name);
            fs::write(&path, doc.contents).map_err(|source| DocsError::Write {
                path: path.clone(),
                source,
            })?;
            info!(version = %doc.version, path = %path.display(), "docs written");
            written.push(path);
        }

        Ok(written)
    }
}

pub fn markup_to_markdown(text: &str) -> String {
    text.replace("{b}", "**")
        .replace("{/b}", "**")
        .replace("{i}", "*")
        .replace("{/i}", "*")
}

pub fn markup_to_html(text: &str) -> String {
    text.replace("{b}", "<b>")
        .replace("{/b}", "</b>")
        .replace("{i}", "<i>")
        .replace("{/i}", "</i>")
}

fn render_markdown(version: &str, methods: &[(String, MethodDoc)]) -> String {
    let mut lines = vec![format!("# Documentation for version {version}")];

    for (name, doc) in methods {
        lines.push(format!("## {name}"));
        lines.push(markup_to_markdown(&doc.description));

        if !doc.params.is_empty() {
            lines.push("\n| Parameter | Type | Description |".to_string());
            lines.push("|-----------|------|-------------|".to_string());
            for param in &doc.params {
                lines.push(format!(
                    "| {} | {} | {} |",
                    param.name,
                    param.ty,
                    markup_to_markdown(&param.description)
                ));
            }
        }

        let example = doc.example.clone().unwrap_or_default();
        lines.push(format!("\n```{}", example.lang));
        lines.push(example.code);
        lines.push("```".to_string());
    }

    lines.join("\n")
}

fn render_html(version: &str, methods: &[(String, MethodDoc)]) -> String {
    let mut lines = vec![
        "<html>".to_string(),
        "<head>".to_string(),
        "\t\t<title>Documentation</title>".to_string(),
        "</head>".to_string(),
        "<body>".to_string(),
        format!("\t<h1>Documentation for version {version}</h1>"),
    ];

    for (name, doc) in methods {
        lines.push(format!("\t<h2>{name}</h2>"));
        lines.push(format!("\t<p>{}</p>", markup_to_html(&doc.description)));

        if !doc.params.is_empty() {
            lines.extend(
                [
                    "\t<table>",
                    "\t\t<thead>",
                    "\t\t\t<tr>",
                    "\t\t\t\t<th>Parameter</th>",
                    "\t\t\t\t<th>Type</th>",
                    "\t\t\t\t<th>Description</th>",
                    "\t\t\t</tr>",
                    "\t\t</thead>",
                    "\t\t<tbody>",
                ]
                .map(String::from),
            );
            for param in &doc.params {
                lines.push("\t\t\t<tr>".to_string());
                lines.push(format!("\t\t\t\t<td>{}</td>", param.name));
                lines.push(format!("\t\t\t\t<td>{}</td>", param.ty));
                lines.push(format!(
                    "\t\t\t\t<td>{}</td>",
                    markup_to_html(&param.description)
                ));
                lines.push("\t\t\t</tr>".to_string());
            }
            lines.push("\t\t</tbody>".to_string());
            lines.push("\t</table>".to_string());
        }

        lines.push("\t<pre>".to_string());
        lines.push(doc.example.as_ref().map(|e| e.code.clone()).unwrap_or_default());
        lines.push("\t</pre>".to_string());
    }

    lines.push("</body>".to_string());
    lines.join("\n")
}
