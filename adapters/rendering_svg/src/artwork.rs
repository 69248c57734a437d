use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    fmt, fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::{bail, Context, Result};
use snake_tester_core::DEFAULT_STYLE_KEY as DEFAULT_KEY;
use snake_tester_rendering::{ArtworkHandle, ArtworkKind, ArtworkResolver};

const SUPPORTED_MANIFEST_VERSION: u32 = 1;

type Loader = Box<dyn Fn(&Path) -> Result<String>>;

/// Head and tail artwork declared by a manifest, loaded on first use.
pub struct ArtworkLibrary {
    heads: BTreeMap<String, PathBuf>,
    tails: BTreeMap<String, PathBuf>,
    loader: Loader,
    markup: RefCell<HashMap<ArtworkHandle, Rc<str>>>,
}

impl fmt::Debug for ArtworkLibrary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArtworkLibrary")
            .field("heads", &self.heads)
            .field("tails", &self.tails)
            .field("loaded", &self.markup.borrow().len())
            .finish_non_exhaustive()
    }
}

impl ArtworkLibrary {
    /// Loads artwork from the manifest located at the provided path.
    pub fn from_manifest_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_manifest_with_loader(path, default_loader)
    }

    /// Returns the default manifest path relative to the repository root.
    #[must_use]
    pub fn default_manifest_path() -> PathBuf {
        PathBuf::from("assets/manifest.toml")
    }

    /// Reads the manifest at `path`; artwork files are read through `loader`.
    pub fn from_manifest_with_loader(
        path: impl AsRef<Path>,
        loader: impl Fn(&Path) -> Result<String> + 'static,
    ) -> Result<Self> {
        let manifest_path = path.as_ref();
        let contents = fs::read_to_string(manifest_path).with_context(|| {
            format!(
                "failed to read artwork manifest at {}",
                manifest_path.display()
            )
        })?;
        let base = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_manifest_str(&contents, &base, loader)
    }

    /// Parses manifest text whose paths are relative to `base`.
    pub fn from_manifest_str(
        contents: &str,
        base: &Path,
        loader: impl Fn(&Path) -> Result<String> + 'static,
    ) -> Result<Self> {
        let (heads, tails) = parse_manifest(contents, base)?;
        Ok(Self {
            heads,
            tails,
            loader: Box::new(loader),
            markup: RefCell::new(HashMap::new()),
        })
    }

    /// Returns whether the library declares the key for the kind.
    #[must_use]
    pub fn contains(&self, kind: ArtworkKind, key: &str) -> bool {
        self.entries(kind).contains_key(key)
    }

    /// Returns the number of artwork files read so far.
    #[must_use]
    pub fn loaded_count(&self) -> usize {
        self.markup.borrow().len()
    }

    /// Markup of the artwork, read from disk on first request.
    pub fn markup(&self, handle: &ArtworkHandle) -> Result<Rc<str>> {
        if let Some(markup) = self.markup.borrow().get(handle) {
            return Ok(Rc::clone(markup));
        }

        let path = self
            .entries(handle.kind())
            .get(handle.key())
            .with_context(|| format!("artwork {handle:?} missing from library"))?;
        let markup: Rc<str> = (self.loader)(path)
            .with_context(|| format!("failed to load artwork {handle:?} from {}", path.display()))?
            .into();
        let _previous = self
            .markup
            .borrow_mut()
            .insert(handle.clone(), Rc::clone(&markup));
        Ok(markup)
    }

    fn entries(&self, kind: ArtworkKind) -> &BTreeMap<String, PathBuf> {
        match kind {
            ArtworkKind::Head => &self.heads,
            ArtworkKind::Tail => &self.tails,
        }
    }
}

impl ArtworkResolver for ArtworkLibrary {
    fn resolve(&self, kind: ArtworkKind, key: &str) -> ArtworkHandle {
        if self.contains(kind, key) {
            ArtworkHandle::new(kind, key)
        } else {
            ArtworkHandle::new(kind, DEFAULT_KEY)
        }
    }
}

fn default_loader(path: &Path) -> Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read artwork at {}", path.display()))
}

#[derive(Debug, serde::Deserialize)]
struct Manifest {
    version: u32,
    heads: BTreeMap<String, String>,
    tails: BTreeMap<String, String>,
}

type Entries = BTreeMap<String, PathBuf>;

fn parse_manifest(contents: &str, base_path: &Path) -> Result<(Entries, Entries)> {
    let manifest: Manifest =
        toml::from_str(contents).context("failed to parse artwork manifest toml contents")?;
    if manifest.version != SUPPORTED_MANIFEST_VERSION {
        bail!(
            "unsupported artwork manifest version {}; expected {}",
            manifest.version,
            SUPPORTED_MANIFEST_VERSION
        );
    }

    let heads = resolve_entries("heads", manifest.heads, base_path)?;
    let tails = resolve_entries("tails", manifest.tails, base_path)?;
    Ok((heads, tails))
}

fn resolve_entries(
    table: &str,
    entries: BTreeMap<String, String>,
    base_path: &Path,
) -> Result<Entries> {
    if !entries.contains_key(DEFAULT_KEY) {
        bail!("artwork manifest [{table}] missing `{DEFAULT_KEY}` entry");
    }
    Ok(entries
        .into_iter()
        .map(|(key, relative_path)| (key, base_path.join(relative_path)))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    const MANIFEST: &str = r#"
        version = 1

        [heads]
        default = "heads/default.svg"
        tongue = "heads/tongue.svg"

        [tails]
        default = "tails/default.svg"
    "#;

    #[test]
    fn manifest_requires_default_entries() {
        let manifest = r#"
            version = 1

            [heads]
            tongue = "heads/tongue.svg"

            [tails]
            default = "tails/default.svg"
        "#;

        let result = parse_manifest(manifest, Path::new("assets"));
        assert!(result.is_err(), "manifest without a default head should fail");
    }

    #[test]
    fn manifest_rejects_unknown_versions() {
        let manifest = MANIFEST.replace("version = 1", "version = 2");

        let result = parse_manifest(&manifest, Path::new("assets"));
        assert!(result.is_err(), "version 2 must be rejected");
    }

    #[test]
    fn manifest_resolves_paths_relative_to_base_directory() {
        let (heads, tails) =
            parse_manifest(MANIFEST, Path::new("root")).expect("manifest should parse");

        assert_eq!(
            heads.get("tongue"),
            Some(&PathBuf::from("root/heads/tongue.svg"))
        );
        assert_eq!(
            tails.get("default"),
            Some(&PathBuf::from("root/tails/default.svg"))
        );
    }

    #[test]
    fn unknown_keys_fall_back_to_default() {
        let library = ArtworkLibrary::from_manifest_str(MANIFEST, Path::new("assets"), |_| {
            Ok(String::new())
        })
        .expect("library should load");

        assert_eq!(
            library.resolve(ArtworkKind::Head, "tongue"),
            ArtworkHandle::new(ArtworkKind::Head, "tongue")
        );
        assert_eq!(
            library.resolve(ArtworkKind::Tail, "tongue"),
            ArtworkHandle::new(ArtworkKind::Tail, "default")
        );
        assert_eq!(
            library.resolve(ArtworkKind::Head, "missing"),
            ArtworkHandle::new(ArtworkKind::Head, "default")
        );
    }

    #[test]
    fn library_reads_each_artwork_once() {
        let reads = Rc::new(Cell::new(0));
        let counter = Rc::clone(&reads);
        let library = ArtworkLibrary::from_manifest_str(MANIFEST, Path::new("assets"), move |path| {
            counter.set(counter.get() + 1);
            Ok(format!("<svg>{}</svg>", path.display()))
        })
        .expect("library should load");
        let head = library.resolve(ArtworkKind::Head, "default");

        let first = library.markup(&head).expect("markup loads");
        let second = library.markup(&head).expect("markup is cached");

        assert_eq!(first, second);
        assert_eq!(&*first, "<svg>assets/heads/default.svg</svg>");
        assert_eq!(reads.get(), 1, "loader should be invoked exactly once per key");
        assert_eq!(library.loaded_count(), 1);
    }
}
