//! Multipart form shared by the category and variation endpoints.

use axum::extract::Multipart;
use catalog_core::document::{ImageFile, ImageRef, Placement};
use catalog_core::mutation::{CategoryUpdate, NewCategory, NewVariation, VariationUpdate};

use crate::error::{ApiError, ApiResult};

/// Fields of the admin upload form. Text fields default to empty so the
/// core validation produces the user-facing message.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub name: String,
    pub root_category: String,
    pub sub_category: String,
    pub category_type: String,
    pub image: Option<ImageFile>,
    /// Current image of an edited item, echoed back by the form.
    pub image_url: String,
    pub image_path: String,
}

impl UploadForm {
    pub async fn from_multipart(mut multipart: Multipart) -> ApiResult<Self> {
        let mut form = UploadForm::default();
        while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            if name == "image" {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                // Browsers submit an empty part when no file was picked.
                if !bytes.is_empty() {
                    form.image = Some(ImageFile::new(file_name, content_type, bytes.to_vec()));
                }
                continue;
            }

            let value = field.text().await.map_err(bad_multipart)?;
            match name.as_str() {
                "name" => form.name = value,
                "rootCategory" => form.root_category = value,
                "subCategory" => form.sub_category = value,
                "type" => form.category_type = value,
                "imageUrl" => form.image_url = value,
                "imagePath" => form.image_path = value,
                other => tracing::debug!(field = other, "ignoring unknown form field"),
            }
        }
        Ok(form)
    }

    pub fn placement(&self) -> Placement {
        Placement::new(
            self.root_category.clone(),
            self.sub_category.clone(),
            self.category_type.clone(),
        )
    }

    /// New upload if one was attached, otherwise the image already stored.
    fn into_image_ref(self) -> ImageRef {
        match self.image {
            Some(file) => ImageRef::Uploaded(file),
            None => ImageRef::persisted(self.image_url, self.image_path),
        }
    }

    pub fn into_new_category(self) -> NewCategory {
        NewCategory {
            placement: self.placement(),
            name: self.name,
            image: self.image,
        }
    }

    pub fn into_category_update(mut self) -> CategoryUpdate {
        let placement = self.placement();
        let name = std::mem::take(&mut self.name);
        CategoryUpdate {
            placement,
            name,
            image: self.into_image_ref(),
        }
    }

    pub fn into_new_variation(self) -> NewVariation {
        NewVariation {
            placement: self.placement(),
            name: self.name,
            image: self.image,
        }
    }

    pub fn into_variation_update(mut self) -> VariationUpdate {
        let placement = self.placement();
        let name = std::mem::take(&mut self.name);
        VariationUpdate {
            placement,
            name,
            image: self.into_image_ref(),
        }
    }
}

fn bad_multipart(err: axum::extract::multipart::MultipartError) -> ApiError {
    ApiError::BadRequest(format!("invalid multipart body: {err}"))
}
