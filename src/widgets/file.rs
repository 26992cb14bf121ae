//! FileUpload widget: an `<input type='file'>` with server-side storage.
//!
//! Uploads arrive as multipart POSTs. The file part is written under the
//! configured upload folder when its extension is on the allow-list; a
//! disallowed extension is dropped silently and the callback still fires,
//! without the `filename` / `upload_path` entries.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{json, Map, Value};

use crate::element::Element;
use crate::error::{CallbackError, WidgetError};
use crate::event::EventSpec;
use crate::options::{OptionKey, OptionValue, WidgetOptions};
use crate::transport::script::AdapterSpec;
use crate::transport::Transport;
use crate::value::EventProps;
use crate::widget::{Channel, Include, Render, WidgetHandle, WidgetState};
use crate::widgets::Core;

const SUPPORTED: &[OptionKey] = &[
    OptionKey::Description,
    OptionKey::PropertiesMap,
    OptionKey::StyleMap,
    OptionKey::AttributesList,
    OptionKey::CssClassesList,
    OptionKey::Disabled,
    OptionKey::Multiple,
    OptionKey::UploadFolder,
    OptionKey::AllowedExtensions,
    OptionKey::Hidden,
    OptionKey::ToolTip,
];

/// Extensions accepted when no `allowed-extensions` option is given.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[
    "txt", "pdf", "png", "jpg", "jpeg", "gif", "doc", "docx", "xls", "xlsx",
];

fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
}

struct FileUploadState {
    element: Element,
    upload_folder: PathBuf,
    allowed: Vec<String>,
    disabled: bool,
    last_upload: Option<PathBuf>,
}

impl WidgetState for FileUploadState {
    fn element(&self) -> &Element {
        &self.element
    }

    fn element_mut(&mut self) -> &mut Element {
        &mut self.element
    }

    fn observable(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("disabled".into(), json!(self.disabled));
        map.insert(
            "last_upload".into(),
            json!(self.last_upload.as_ref().map(|p| p.display().to_string())),
        );
        map
    }

    fn apply_event(&mut self, props: &mut EventProps) {
        if self.disabled {
            return;
        }
        let Some(file) = props.take_file() else {
            return;
        };
        let allowed = extension_of(&file.filename)
            .map(|ext| self.allowed.iter().any(|a| *a == ext))
            .unwrap_or(false);
        if !allowed {
            tracing::warn!(filename = %file.filename, "dropping upload with disallowed extension");
            return;
        }
        if let Err(err) = std::fs::create_dir_all(&self.upload_folder) {
            tracing::error!(folder = %self.upload_folder.display(), %err, "upload folder unavailable");
            return;
        }
        let path = self.upload_folder.join(&file.filename);
        if let Err(err) = std::fs::write(&path, &file.bytes) {
            tracing::error!(path = %path.display(), %err, "writing upload failed");
            return;
        }
        props.insert("filename", file.filename.as_str());
        props.insert("upload_path", path.display().to_string());
        self.last_upload = Some(path);
    }

    fn adapter(&self) -> AdapterSpec {
        // Multipart submission bypasses the query-string wiring; the upload
        // form posts straight to the widget's upload endpoint.
        AdapterSpec::new()
    }
}

/// A file upload field with server-side storage.
#[derive(Clone)]
pub struct FileUpload {
    core: Core<FileUploadState>,
}

impl FileUpload {
    /// Create an upload field and register its endpoints.
    pub fn new(
        id: &str,
        upload_folder: impl Into<PathBuf>,
        transport: Arc<dyn Transport>,
        options: &WidgetOptions,
    ) -> Result<Self, WidgetError> {
        options.check_supported(SUPPORTED)?;
        let disabled = options.flag(OptionKey::Disabled).unwrap_or(false);
        let allowed = options
            .get(OptionKey::AllowedExtensions)
            .and_then(OptionValue::as_list)
            .map(|l| l.iter().map(|e| e.to_lowercase()).collect())
            .unwrap_or_else(|| {
                DEFAULT_ALLOWED_EXTENSIONS
                    .iter()
                    .map(|e| (*e).to_owned())
                    .collect()
            });

        let mut element = Element::new("input", id).with_property("type", "file");
        if options.flag(OptionKey::Multiple).unwrap_or(false) {
            element.add_boolean_attr("multiple");
        }
        if disabled {
            element.add_boolean_attr("disabled");
        }
        options.apply_common(&mut element);

        let state = FileUploadState {
            element,
            upload_folder: upload_folder.into(),
            allowed,
            disabled,
            last_upload: None,
        };
        let core = Core::attach(
            module_path!(),
            id,
            state,
            vec![EventSpec::post("change")],
            transport,
        );
        Ok(Self { core })
    }

    /// The allowed extensions, lowercased.
    pub fn allowed_extensions(&self) -> Vec<String> {
        self.core.read(|s| s.allowed.clone())
    }

    /// Path of the most recent stored upload.
    pub fn last_upload(&self) -> Option<PathBuf> {
        self.core.read(|s| s.last_upload.clone())
    }

    /// Register the upload callback. Runs after storage; a stored file shows
    /// up as the `filename` / `upload_path` props.
    pub fn on_upload<F>(&self, callback: F)
    where
        F: Fn(&str, &EventProps) -> Result<Value, CallbackError> + Send + Sync + 'static,
    {
        self.core.on("change", Arc::new(callback));
    }
}

impl WidgetHandle for FileUpload {
    fn channel(&self) -> &Channel {
        self.core.channel()
    }
}

impl Render for FileUpload {
    fn render(&self) -> String {
        self.core.render_html()
    }

    fn includes(&self) -> Vec<Include> {
        self.core.include_manifest()
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{Method, Request};
    use crate::value::FilePart;
    use crate::widgets::testutil;

    #[test]
    fn renders_file_input() {
        let (_, transport) = testutil::polling();
        let dir = tempfile::tempdir().unwrap();
        let up = FileUpload::new("f", dir.path(), transport, &WidgetOptions::new()).unwrap();
        assert!(up.render().contains("type='file'"));
    }

    #[test]
    fn allowed_upload_is_stored_and_reported() {
        let (host, transport) = testutil::polling();
        let dir = tempfile::tempdir().unwrap();
        let up = FileUpload::new("f", dir.path(), transport, &WidgetOptions::new()).unwrap();
        up.on_upload(|_, props| {
            Ok(json!({
                "filename": props.get_str("filename"),
                "path": props.get_str("upload_path"),
            }))
        });
        let resp = host
            .dispatch(
                &up.event_route("change"),
                Method::Post,
                Request::new().with_file(FilePart::new("notes.txt", b"hello".to_vec())),
            )
            .unwrap();
        let body = resp.body_json().unwrap();
        assert_eq!(body["result"]["filename"], json!("notes.txt"));

        let stored = dir.path().join("notes.txt");
        assert_eq!(std::fs::read(&stored).unwrap(), b"hello");
        assert_eq!(up.last_upload(), Some(stored));
    }

    #[test]
    fn disallowed_extension_dropped_silently() {
        let (host, transport) = testutil::polling();
        let dir = tempfile::tempdir().unwrap();
        let up = FileUpload::new("f", dir.path(), transport, &WidgetOptions::new()).unwrap();
        up.on_upload(|_, props| {
            // Callback still fires, with no filename entry at all.
            assert!(!props.contains("filename"));
            assert!(!props.contains("upload_path"));
            Ok(json!("handled"))
        });
        let resp = host
            .dispatch(
                &up.event_route("change"),
                Method::Post,
                Request::new().with_file(FilePart::new("evil.exe", b"MZ".to_vec())),
            )
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(resp.body_json().unwrap(), json!({"result": "handled"}));
        assert!(!dir.path().join("evil.exe").exists());
        assert_eq!(up.last_upload(), None);
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        let (host, transport) = testutil::polling();
        let dir = tempfile::tempdir().unwrap();
        let up = FileUpload::new("f", dir.path(), transport, &WidgetOptions::new()).unwrap();
        host.dispatch(
            &up.event_route("change"),
            Method::Post,
            Request::new().with_file(FilePart::new("PHOTO.JPG", b"img".to_vec())),
        )
        .unwrap();
        assert!(dir.path().join("PHOTO.JPG").exists());
    }

    #[test]
    fn custom_allow_list_overrides_default() {
        let (host, transport) = testutil::polling();
        let dir = tempfile::tempdir().unwrap();
        let opts = WidgetOptions::new().with(
            OptionKey::AllowedExtensions,
            OptionValue::List(vec!["csv".into()]),
        );
        let up = FileUpload::new("f", dir.path(), transport, &opts).unwrap();
        assert_eq!(up.allowed_extensions(), vec!["csv".to_owned()]);

        host.dispatch(
            &up.event_route("change"),
            Method::Post,
            Request::new().with_file(FilePart::new("data.txt", b"x".to_vec())),
        )
        .unwrap();
        assert!(!dir.path().join("data.txt").exists());
    }

    #[test]
    fn upload_folder_created_on_demand() {
        let (host, transport) = testutil::polling();
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let up = FileUpload::new("f", &nested, transport, &WidgetOptions::new()).unwrap();
        host.dispatch(
            &up.event_route("change"),
            Method::Post,
            Request::new().with_file(FilePart::new("x.txt", b"x".to_vec())),
        )
        .unwrap();
        assert!(nested.join("x.txt").exists());
    }
}
