use url::Url;

use crate::LoadError;

/// Parses an absolute document URL.
pub(crate) fn parse_absolute(raw: &str) -> Result<Url, LoadError> {
    let trimmed = raw.trim();
    Url::parse(trimmed).map_err(|err| malformed(raw, err))
}

/// Resolves a resource reference against the document URL of its frame.
///
/// Absolute references are taken as they are; relative ones need a base.
pub(crate) fn resolve(base: Option<&Url>, reference: &str) -> Result<Url, LoadError> {
    let trimmed = reference.trim();
    if trimmed.is_empty() {
        return Err(LoadError::MalformedUrl {
            url: reference.to_string(),
            reason: "empty url".to_string(),
        });
    }
    match Url::parse(trimmed) {
        Ok(url) => Ok(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => match base {
            Some(base) => base.join(trimmed).map_err(|err| malformed(reference, err)),
            None => Err(LoadError::MalformedUrl {
                url: reference.to_string(),
                reason: "relative url without a document base".to_string(),
            }),
        },
        Err(err) => Err(malformed(reference, err)),
    }
}

fn malformed(raw: &str, err: url::ParseError) -> LoadError {
    LoadError::MalformedUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    }
}
