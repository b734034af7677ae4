use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::DynamicImage;
use std::fmt;
use std::fmt::{Display, Formatter};
use std::fs;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// 표지 이미지 저장 규격. 저장 전에 이 크기로 다시 인코딩 된다.
const COVER_WIDTH: u32 = 400;
const COVER_HEIGHT: u32 = 600;
const JPEG_QUALITY: u8 = 80;

const COVER_FILE_PREFIX: &str = "cover_";

#[derive(Debug)]
pub enum CoverError {
    DecodeFailed(String),
    WriteFailed(String),
}

impl Display for CoverError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// 로컬 표지 이미지 저장소
///
/// 파일 이름은 ISBN에서 결정적으로 만들어진다. 로컬 표지가 존재하면 표시에
/// 우선 사용 되지만 레코드에 저장된 원격 URL 값은 바꾸지 않는다.
pub struct CoverImageStore {
    dir: PathBuf,
}

impl CoverImageStore {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    /// ISBN에 대응하는 표지 파일 경로를 만든다.
    pub fn path_for(&self, isbn: &str) -> PathBuf {
        self.dir.join(format!("{}{}.jpg", COVER_FILE_PREFIX, isbn))
    }

    /// 이미지를 고정 크기 JPEG으로 다시 인코딩해 저장하고 경로를 반환 한다.
    pub fn save(&self, isbn: &str, image: &DynamicImage) -> Result<PathBuf, CoverError> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| CoverError::WriteFailed(e.to_string()))?;

        let resized = image.resize_exact(COVER_WIDTH, COVER_HEIGHT, FilterType::Triangle);
        let path = self.path_for(isbn);

        let file = File::create(&path)
            .map_err(|e| CoverError::WriteFailed(e.to_string()))?;
        let encoder = JpegEncoder::new_with_quality(BufWriter::new(file), JPEG_QUALITY);
        resized.write_with_encoder(encoder)
            .map_err(|e| CoverError::WriteFailed(e.to_string()))?;

        Ok(path)
    }

    /// 인코딩 되지 않은 이미지 바이트를 디코딩해 저장 한다.
    pub fn save_bytes(&self, isbn: &str, bytes: &[u8]) -> Result<PathBuf, CoverError> {
        let image = image::load_from_memory(bytes)
            .map_err(|e| CoverError::DecodeFailed(e.to_string()))?;

        self.save(isbn, &image)
    }

    /// 이미지 파일을 읽어 저장 한다.
    pub fn save_file<P: AsRef<Path>>(&self, isbn: &str, source: P) -> Result<PathBuf, CoverError> {
        let image = image::open(source)
            .map_err(|e| CoverError::DecodeFailed(e.to_string()))?;

        self.save(isbn, &image)
    }

    /// 저장된 표지가 있으면 경로를 반환 한다.
    pub fn find(&self, isbn: &str) -> Option<PathBuf> {
        let path = self.path_for(isbn);
        path.exists().then_some(path)
    }

    /// 표시용 표지 참조를 결정 한다. 로컬 파일이 있으면 로컬 파일이 우선이며
    /// 없으면 저장된 원격 URL을 그대로 쓴다.
    pub fn resolve_display_cover(&self, isbn: &str, cover_url: Option<&str>) -> Option<String> {
        if let Some(path) = self.find(isbn) {
            return Some(path.to_string_lossy().into_owned());
        }

        cover_url.map(|url| url.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    fn sample_image() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 30, image::Rgb([120, 40, 200])))
    }

    #[test]
    fn save_uses_deterministic_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = CoverImageStore::new(dir.path());

        let path = store.save("9780441013593", &sample_image()).unwrap();

        assert_eq!(path.file_name().unwrap(), "cover_9780441013593.jpg");
        assert!(path.exists());
    }

    #[test]
    fn save_re_encodes_to_fixed_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let store = CoverImageStore::new(dir.path());

        let path = store.save("9780441013593", &sample_image()).unwrap();

        let reloaded = image::open(path).unwrap();
        assert_eq!(reloaded.width(), 400);
        assert_eq!(reloaded.height(), 600);
    }

    #[test]
    fn find_reports_only_existing_covers() {
        let dir = tempfile::tempdir().unwrap();
        let store = CoverImageStore::new(dir.path());

        assert_eq!(store.find("9780441013593"), None);

        store.save("9780441013593", &sample_image()).unwrap();
        assert!(store.find("9780441013593").is_some());
    }

    #[test]
    fn display_cover_prefers_local_file_over_remote_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = CoverImageStore::new(dir.path());
        let remote = Some("https://books.google.com/dune.jpg");

        assert_eq!(
            store.resolve_display_cover("9780441013593", remote),
            Some("https://books.google.com/dune.jpg".to_owned())
        );

        let local = store.save("9780441013593", &sample_image()).unwrap();
        assert_eq!(
            store.resolve_display_cover("9780441013593", remote),
            Some(local.to_string_lossy().into_owned())
        );
    }

    #[test]
    fn save_bytes_rejects_undecodable_input() {
        let dir = tempfile::tempdir().unwrap();
        let store = CoverImageStore::new(dir.path());

        let result = store.save_bytes("9780441013593", b"not an image");

        assert!(matches!(result, Err(CoverError::DecodeFailed(_))));
    }
}
