//! Multipart form handling for the registration, avatar and listing forms.
//!
//! Text parts are collected by name; file parts are accepted only for the
//! names the caller expects, must be images, and are size-checked.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::{multipart::Field, Multipart};
use staynest_common::error::{StayError, StayResult};

/// Image types accepted for profile pictures and listing photos.
pub fn is_allowed_image(content_type: &str) -> bool {
    matches!(
        content_type,
        "image/jpeg" | "image/png" | "image/gif" | "image/webp" | "image/avif"
    )
}

/// An image part read into memory.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// A fully read multipart body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, Vec<String>>,
    files: HashMap<String, Vec<UploadedImage>>,
}

impl MultipartForm {
    /// Drain `multipart`, treating parts named in `file_fields` as images.
    pub async fn read(mut multipart: Multipart, file_fields: &[&str], max_bytes: usize) -> StayResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await.map_err(|e| StayError::Validation {
            message: format!("Multipart error: {e}"),
        })? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            if file_fields.contains(&name.as_str()) {
                if let Some(image) = read_image(field, &name, max_bytes).await? {
                    form.files.entry(name).or_default().push(image);
                }
            } else {
                let text = field.text().await.map_err(|e| StayError::Validation {
                    message: format!("Failed to read field '{name}': {e}"),
                })?;
                form.fields.entry(name).or_default().push(text);
            }
        }

        Ok(form)
    }

    /// First value of a text field.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(|v| v.first()).map(String::as_str)
    }

    /// Trimmed text field, empty when absent.
    pub fn string(&self, name: &str) -> String {
        self.text(name).map(str::trim).unwrap_or_default().to_string()
    }

    /// Parse a numeric field.
    pub fn number<T: FromStr>(&self, name: &str) -> StayResult<T> {
        let raw = self
            .text(name)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| StayError::validation(format!("'{name}' is required")))?;
        raw.parse()
            .map_err(|_| StayError::validation(format!("'{name}' must be a number")))
    }

    /// All values of a list field. Accepts repeated parts, a JSON array in a
    /// single part, or both.
    pub fn list(&self, name: &str) -> Vec<String> {
        self.fields
            .get(name)
            .map(|values| values.iter().flat_map(|v| split_list_value(v)).collect())
            .unwrap_or_default()
    }

    /// Take the images uploaded under `name`.
    pub fn take_files(&mut self, name: &str) -> Vec<UploadedImage> {
        self.files.remove(name).unwrap_or_default()
    }
}

async fn read_image(field: Field<'_>, name: &str, max_bytes: usize) -> StayResult<Option<UploadedImage>> {
    let content_type = field.content_type().unwrap_or("application/octet-stream").to_string();

    let data = field.bytes().await.map_err(|e| StayError::Validation {
        message: format!("Failed to read file '{name}': {e}"),
    })?;

    // browsers send an empty part for an unset file input
    if data.is_empty() {
        return Ok(None);
    }
    if !is_allowed_image(&content_type) {
        return Err(StayError::validation(format!(
            "File type '{content_type}' is not allowed for '{name}'"
        )));
    }
    if data.len() > max_bytes {
        return Err(StayError::validation(format!(
            "File too large: {} bytes (max {max_bytes} bytes)",
            data.len()
        )));
    }

    Ok(Some(UploadedImage {
        content_type,
        data: data.to_vec(),
    }))
}

fn split_list_value(value: &str) -> Vec<String> {
    let trimmed = value.trim();
    if trimmed.starts_with('[') {
        if let Ok(items) = serde_json::from_str::<Vec<String>>(trimmed) {
            return items
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
    }
    if trimmed.is_empty() {
        Vec::new()
    } else {
        vec![trimmed.to_string()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::FromRequest, http::Request};

    const BOUNDARY: &str = "staynest-boundary";

    fn multipart_request(parts: &[(&str, Option<(&str, &str)>, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match file {
                Some((file_name, content_type)) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{file_name}\"\r\n\
                             Content-Type: {content_type}\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                }
                None => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
                    );
                }
            }
            body.extend_from_slice(data);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", format!("multipart/form-data; boundary={BOUNDARY}"))
            .body(Body::from(body))
            .unwrap()
    }

    async fn read(req: Request<Body>, max: usize) -> StayResult<MultipartForm> {
        let multipart = Multipart::from_request(req, &()).await.unwrap();
        MultipartForm::read(multipart, &["listingPhotos"], max).await
    }

    #[tokio::test]
    async fn collects_text_and_images() {
        let req = multipart_request(&[
            ("title", None, b"Lake cabin"),
            ("guestCount", None, b" 4 "),
            ("amenities", None, br#"["Wifi","Kitchen"]"#),
            ("amenities", None, b"Sauna"),
            ("listingPhotos", Some(("a.png", "image/png")), b"\x89PNG"),
            ("listingPhotos", Some(("b.jpg", "image/jpeg")), b"\xff\xd8"),
        ]);
        let mut form = read(req, 1024).await.unwrap();

        assert_eq!(form.string("title"), "Lake cabin");
        assert_eq!(form.number::<i32>("guestCount").unwrap(), 4);
        assert_eq!(form.list("amenities"), vec!["Wifi", "Kitchen", "Sauna"]);
        let photos = form.take_files("listingPhotos");
        assert_eq!(photos.len(), 2);
        assert_eq!(photos[0].content_type, "image/png");
        assert!(form.take_files("listingPhotos").is_empty());
    }

    #[tokio::test]
    async fn rejects_non_images() {
        let req = multipart_request(&[("listingPhotos", Some(("run.sh", "text/x-shellscript")), b"echo")]);
        assert!(matches!(read(req, 1024).await, Err(StayError::Validation { .. })));
    }

    #[tokio::test]
    async fn rejects_oversized_images() {
        let req = multipart_request(&[("listingPhotos", Some(("big.png", "image/png")), &[0u8; 64])]);
        assert!(read(req, 16).await.is_err());
    }

    #[test]
    fn number_reports_missing_and_garbage() {
        let mut form = MultipartForm::default();
        assert!(form.number::<i64>("price").is_err());
        form.fields.insert("price".into(), vec!["12,000".into()]);
        assert!(form.number::<i64>("price").is_err());
    }

    #[test]
    fn list_values_skip_blanks() {
        assert!(split_list_value("  ").is_empty());
        assert_eq!(split_list_value("[\" Wifi \", \"\"]"), vec!["Wifi"]);
        assert_eq!(split_list_value("[not json"), vec!["[not json"]);
    }
}
