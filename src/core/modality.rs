use crate::domain::model::Modality;
use std::path::Path;

const IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];
const AUDIO_EXTENSIONS: [&str; 4] = ["mp3", "wav", "m4a", "ogg"];
const VIDEO_EXTENSIONS: [&str; 3] = ["mp4", "mov", "avi"];

/// Determines the media modality from a file reference's name suffix.
/// Pure string inspection; an unrecognized suffix is `Unsupported`, never
/// an error.
pub fn detect(file_reference: &str) -> Modality {
    let Some(extension) = extension_of(file_reference) else {
        return Modality::Unsupported;
    };

    if IMAGE_EXTENSIONS.contains(&extension.as_str()) {
        Modality::Image
    } else if AUDIO_EXTENSIONS.contains(&extension.as_str()) {
        Modality::Audio
    } else if VIDEO_EXTENSIONS.contains(&extension.as_str()) {
        Modality::Video
    } else {
        Modality::Unsupported
    }
}

/// Lowercased extension of a reference, with any URL query or fragment
/// stripped first. Returns `None` when the name has no extension.
pub fn extension_of(file_reference: &str) -> Option<String> {
    let without_query = file_reference
        .split(['?', '#'])
        .next()
        .unwrap_or(file_reference);

    let name = without_query.rsplit('/').next().unwrap_or(without_query);

    let (stem, extension) = name.rsplit_once('.')?;
    if stem.is_empty() || extension.is_empty() {
        return None;
    }
    Some(extension.to_lowercase())
}

/// MIME type handed to the vision model together with image bytes.
pub fn image_mime(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        _ => "image/jpeg",
    }
}
