use axum::{
    Form,
    body::Body,
    extract::{FromRequest, Multipart},
};
use serde::Deserialize;

use crate::error::SubmissionError;

/// The optional `text` field of a submission
///
/// Read from `multipart/form-data` or `application/x-www-form-urlencoded`
/// bodies. A missing field is `None`; validation happens later.
pub struct ExtractText(pub Option<String>);

#[derive(Deserialize)]
struct TextForm {
    text: Option<String>,
}

impl<S> FromRequest<S> for ExtractText
where
    S: Send + Sync,
{
    type Rejection = SubmissionError;

    async fn from_request(request: http::Request<Body>, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = request
            .headers()
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|v| v.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(form) = Form::<TextForm>::from_request(request, state)
                .await
                .map_err(|e| SubmissionError::Validation(format!("invalid form body: {e}")))?;

            return Ok(Self(form.text));
        }

        let mut multipart = Multipart::from_request(request, state)
            .await
            .map_err(|e| SubmissionError::Validation(format!("invalid multipart body: {e}")))?;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| SubmissionError::Validation(format!("invalid multipart body: {e}")))?
        {
            if field.name() == Some("text") {
                let text = field
                    .text()
                    .await
                    .map_err(|e| SubmissionError::Validation(format!("failed to read 'text' field: {e}")))?;

                return Ok(Self(Some(text)));
            }
        }

        Ok(Self(None))
    }
}
