//! File-system asset loader.
//!
//! Each request is decoded on its own thread and handed back through the
//! request's completion, so `load` never blocks the frame loop.

use std::path::{Path, PathBuf};
use std::thread;

use kitsune_engine::assets::SourceType;
use kitsune_engine::backend::{AssetLoader, Completion, LoadRequest, LoadedPayload, ModelData};
use kitsune_engine::scene::ImageData;

/// Loads manifest paths relative to `root`.
#[derive(Debug, Clone)]
pub struct FsLoader {
    root: PathBuf,
}

impl FsLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl AssetLoader for FsLoader {
    fn load(&self, request: LoadRequest, completion: Completion) {
        let root = self.root.clone();
        let spawned = thread::Builder::new()
            .name(format!("load {}", request.name))
            .spawn(move || match read_payload(&root, &request) {
                Ok(payload) => {
                    log::debug!("loaded {} '{}'", payload.kind_name(), request.name);
                    completion.resolve(payload);
                }
                Err(ReadError { url, reason }) => completion.fail_at(url, reason),
            });

        // A failed spawn drops the closure, and with it the completion, which
        // reports the request as failed.
        if let Err(err) = spawned {
            log::error!("could not start a loader thread: {err}");
        }
    }
}

/// A failed read and the url it is reported under.
#[derive(Debug)]
struct ReadError {
    url: String,
    reason: String,
}

impl ReadError {
    fn at(url: &str) -> impl FnOnce(String) -> ReadError + '_ {
        move |reason| ReadError {
            url: url.to_string(),
            reason,
        }
    }
}

/// Reads and decodes every file of `request`. A failing face of a cube texture
/// is reported under its own url.
fn read_payload(root: &Path, request: &LoadRequest) -> Result<LoadedPayload, ReadError> {
    let whole = request.display_url();
    match request.kind {
        SourceType::Texture => {
            let url = single_url(request).map_err(ReadError::at(&whole))?;
            read_image(&root.join(url))
                .map(LoadedPayload::Texture)
                .map_err(ReadError::at(url))
        }
        SourceType::CubeTexture => {
            if request.urls.len() != 6 {
                let reason = format!("a cube texture needs 6 faces, got {}", request.urls.len());
                return Err(ReadError::at(&whole)(reason));
            }
            let faces = request
                .urls
                .iter()
                .map(|url| read_image(&root.join(url)).map_err(ReadError::at(url)))
                .collect::<Result<Vec<_>, _>>()?;
            let (w, h) = (faces[0].width, faces[0].height);
            if let Some(i) = faces.iter().position(|f| f.width != w || f.height != h) {
                let reason = format!("cube texture faces differ in size ({w}x{h} expected)");
                return Err(ReadError::at(&request.urls[i])(reason));
            }
            Ok(LoadedPayload::CubeTexture(faces))
        }
        SourceType::GltfModel => {
            let url = single_url(request).map_err(ReadError::at(&whole))?;
            read_model(&root.join(url))
                .map(LoadedPayload::Model)
                .map_err(ReadError::at(url))
        }
    }
}

fn single_url(request: &LoadRequest) -> Result<&str, String> {
    match request.urls.as_slice() {
        [url] => Ok(url.as_str()),
        other => Err(format!("expected one path, got {}", other.len())),
    }
}

fn read_image(path: &Path) -> Result<ImageData, String> {
    let img = image::open(path).map_err(|e| format!("failed to decode {}: {e}", path.display()))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    log::trace!("decoded {}x{} image from {}", width, height, path.display());
    Ok(ImageData::new(width, height, rgba.into_raw()))
}

fn read_model(path: &Path) -> Result<ModelData, String> {
    let text =
        std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    ron::from_str(&text).map_err(|e| format!("failed to parse {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_root(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("kitsune-loader-{}-{name}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_png(path: &Path, size: u32, rgba: [u8; 4]) {
        image::RgbaImage::from_pixel(size, size, image::Rgba(rgba)).save(path).unwrap();
    }

    fn request(kind: SourceType, urls: &[&str]) -> LoadRequest {
        LoadRequest {
            name: "probe".to_string(),
            kind,
            urls: urls.iter().map(|u| u.to_string()).collect(),
        }
    }

    // ── textures ──

    #[test]
    fn png_decodes_to_rgba() {
        let root = temp_root("png");
        write_png(&root.join("color.png"), 3, [10, 20, 30, 255]);

        let payload = read_payload(&root, &request(SourceType::Texture, &["color.png"])).unwrap();
        let LoadedPayload::Texture(image) = payload else {
            panic!("expected a texture");
        };
        assert_eq!((image.width, image.height), (3, 3));
        assert_eq!(&image.rgba[..4], &[10, 20, 30, 255]);
        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn missing_file_names_the_path() {
        let root = temp_root("missing");
        let err = read_payload(&root, &request(SourceType::Texture, &["nope.png"])).unwrap_err();
        assert_eq!(err.url, "nope.png");
        assert!(err.reason.contains("nope.png"));
        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn cube_needs_six_matching_faces() {
        let root = temp_root("cube");
        let names = ["px.png", "nx.png", "py.png", "ny.png", "pz.png", "nz.png"];
        for name in names {
            write_png(&root.join(name), 2, [255, 255, 255, 255]);
        }

        let payload = read_payload(&root, &request(SourceType::CubeTexture, &names)).unwrap();
        assert!(matches!(payload, LoadedPayload::CubeTexture(ref faces) if faces.len() == 6));

        let err = read_payload(&root, &request(SourceType::CubeTexture, &names[..5])).unwrap_err();
        assert!(err.reason.contains("6 faces"));

        write_png(&root.join("nz.png"), 4, [0, 0, 0, 255]);
        let err = read_payload(&root, &request(SourceType::CubeTexture, &names)).unwrap_err();
        assert!(err.reason.contains("differ"));
        assert_eq!(err.url, "nz.png");
        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn broken_cube_face_is_reported_under_its_own_url() {
        let root = temp_root("cube-face");
        let names = ["px.png", "nx.png", "py.png", "ny.png", "pz.png", "nz.png"];
        for name in names {
            write_png(&root.join(name), 2, [255, 255, 255, 255]);
        }
        std::fs::write(root.join("py.png"), b"not a png").unwrap();

        let err = read_payload(&root, &request(SourceType::CubeTexture, &names)).unwrap_err();
        assert_eq!(err.url, "py.png");
        assert!(err.reason.contains("py.png"));
        let _ = std::fs::remove_dir_all(root);
    }

    // ── models ──

    #[test]
    fn ron_model_parses() {
        let root = temp_root("model");
        std::fs::write(
            root.join("fox.ron"),
            r#"(nodes: [(name: "root")], animations: [(name: "Survey", tracks: [])])"#,
        )
        .unwrap();

        let payload = read_payload(&root, &request(SourceType::GltfModel, &["fox.ron"])).unwrap();
        let LoadedPayload::Model(model) = payload else {
            panic!("expected a model");
        };
        assert_eq!(model.nodes[0].name, "root");
        assert_eq!(model.animations[0].name, "Survey");
        let _ = std::fs::remove_dir_all(root);
    }

    #[test]
    fn shipped_assets_cover_the_default_scene() {
        use kitsune_engine::assets::Manifest;
        use kitsune_engine::config::Config;

        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../assets");
        let manifest = Manifest::load_from_file(root.join("manifest.ron")).unwrap();
        assert_eq!(manifest, Manifest::default_scene());

        for source in &manifest.sources {
            let payload = read_payload(&root, &source.to_request().unwrap()).unwrap();
            if let LoadedPayload::Model(model) = payload {
                assert!(model.animations.len() >= 3);
            }
        }
    }

    #[test]
    fn malformed_model_is_a_failure() {
        let root = temp_root("bad-model");
        std::fs::write(root.join("fox.ron"), "(nodes: [").unwrap();
        let err = read_payload(&root, &request(SourceType::GltfModel, &["fox.ron"])).unwrap_err();
        assert!(err.reason.contains("failed to parse"));
        let _ = std::fs::remove_dir_all(root);
    }
}
