use crate::config;
use crate::matcher::clean;
use image::{DynamicImage, GenericImageView};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Load an image, downscaling so its longest side fits `CAPCODE_MAX_DIM`.
pub fn load_image<P: AsRef<Path>>(path: P) -> Result<DynamicImage, image::ImageError> {
    let img = image::open(path)?;
    let Some(max_dim) = config::max_dim() else {
        return Ok(img);
    };
    let (orig_w, orig_h) = img.dimensions();
    if orig_w.max(orig_h) > max_dim {
        Ok(img.resize(max_dim, max_dim, image::imageops::FilterType::Triangle))
    } else {
        Ok(img)
    }
}

/// Default dataset root from environment variables.
pub fn dataset_root_from_env() -> PathBuf {
    env::var("CAPCODE_DATASET_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("benches/images"))
}

/// Default bench limit from environment variables.
///
/// Returns `None` (full dataset) when `CAPCODE_BENCH_LIMIT` is unset or `0`.
pub fn bench_limit_from_env() -> Option<usize> {
    env::var("CAPCODE_BENCH_LIMIT")
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .filter(|&v| v > 0)
}

/// Expected code for a dataset image, read from its `.txt` sibling.
///
/// The first line that is neither blank nor a `#` comment is cleaned to
/// `[A-Z0-9]`. Returns `None` when there is no usable label.
pub fn parse_expected_code<P: AsRef<Path>>(txt_path: P) -> Option<String> {
    let content = fs::read_to_string(txt_path).ok()?;
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#'))
        .map(clean)
        .filter(|code| !code.is_empty())
}

/// Label path for an image (`cap_001.jpg` -> `cap_001.txt`).
pub fn label_path(image: &Path) -> PathBuf {
    image.with_extension("txt")
}

/// Image files under `root`, recursively, sorted by path, with an optional limit.
///
/// Unreadable directories are skipped.
pub fn dataset_iter<P: AsRef<Path>>(
    root: P,
    limit: Option<usize>,
) -> impl Iterator<Item = PathBuf> {
    let mut pending = vec![root.as_ref().to_path_buf()];
    let mut images = Vec::new();
    while let Some(dir) = pending.pop() {
        let Ok(entries) = fs::read_dir(&dir) else {
            continue;
        };
        for path in entries.flatten().map(|entry| entry.path()) {
            if path.is_dir() {
                pending.push(path);
            } else if is_image_file(&path) {
                images.push(path);
            }
        }
    }
    images.sort();
    images.into_iter().take(limit.unwrap_or(usize::MAX))
}

fn is_image_file(path: &Path) -> bool {
    const EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "bmp", "webp"];
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock before UNIX epoch")
            .as_nanos();
        let sequence = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = env::temp_dir().join(format!("capcode_tools_{nanos}_{sequence}"));
        fs::create_dir_all(&dir).expect("failed to create temp dir");
        dir
    }

    #[test]
    fn parse_expected_code_skips_comments() {
        let dir = temp_dir();
        let path = dir.join("cap.txt");
        fs::write(&path, "# label\n\n  krat-1n2ab \nignored\n").unwrap();
        assert_eq!(parse_expected_code(&path).as_deref(), Some("KRAT1N2AB"));
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn parse_expected_code_missing_or_empty() {
        let dir = temp_dir();
        let path = dir.join("empty.txt");
        fs::write(&path, "# nothing here\n---\n").unwrap();
        assert_eq!(parse_expected_code(&path), None);
        assert_eq!(parse_expected_code(dir.join("absent.txt")), None);
        let _ = fs::remove_dir_all(dir);
    }

    #[test]
    fn dataset_iter_sorts_filters_and_limits() {
        let dir = temp_dir();
        fs::create_dir_all(dir.join("sub")).unwrap();
        for name in ["b.png", "a.JPG", "sub/c.jpeg", "notes.txt"] {
            fs::write(dir.join(name), b"").unwrap();
        }
        let all: Vec<PathBuf> = dataset_iter(&dir, None).collect();
        assert_eq!(all, vec![dir.join("a.JPG"), dir.join("b.png"), dir.join("sub/c.jpeg")]);
        assert_eq!(dataset_iter(&dir, Some(1)).count(), 1);
        assert_eq!(label_path(&all[1]), dir.join("b.txt"));
        let _ = fs::remove_dir_all(dir);
    }
}
