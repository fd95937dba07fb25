use crate::core::modality;
use crate::domain::model::Category;
use crate::domain::ports::VisionModel;
use std::path::Path;

/// Instruction sent with every classification request. The model is told to
/// answer with one lowercase member of the closed set and to fall back to
/// `other` on its own when unsure.
pub const CATEGORY_PROMPT: &str = "You are an AI for a civic reporting app. \
Look at this photo of a public space. Respond with EXACTLY ONE WORD from this list: \
pothole, garbage, broken_light, graffiti, tree_fall, water_leak, other. \
If unsure, respond with 'other'.";

/// Total classification stage: every failure (unreadable file, transport
/// error, unparseable or off-list answer) degrades to `Category::Other`.
pub struct CategoryClassifier<V: VisionModel> {
    vision: V,
}

impl<V: VisionModel> CategoryClassifier<V> {
    pub fn new(vision: V) -> Self {
        Self { vision }
    }

    pub async fn classify(&self, image: &Path) -> Category {
        let bytes = match tokio::fs::read(image).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!("⚠️ Could not read image {}: {}", image.display(), e);
                return Category::Other;
            }
        };

        let mime_type = modality::image_mime(image);
        match self.vision.generate(CATEGORY_PROMPT, &bytes, mime_type).await {
            Ok(raw) => {
                let category = Category::from_response(&raw);
                tracing::info!("📡 Model answered {:?} -> category '{}'", raw, category);
                category
            }
            Err(e) => {
                tracing::warn!("⚠️ Vision model call failed: {}", e);
                Category::Other
            }
        }
    }
}
