use poise::serenity_prelude as serenity;
use reqwest::header::CONTENT_TYPE;

/// Discord rejects avatar uploads above this size.
pub const MAX_AVATAR_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("`{0}` is not an http(s) url")]
    InvalidUrl(String),
    #[error("download failed: {0}")]
    Download(#[from] reqwest::Error),
    #[error("download returned HTTP {0}")]
    Status(reqwest::StatusCode),
    #[error("download is not a supported image (content type `{0}`)")]
    NotAnImage(String),
    #[error("image is at least {0} bytes, above the avatar size limit")]
    TooLarge(usize),
    #[error("discord rejected the avatar: {0}")]
    Discord(#[from] serenity::Error),
}

impl AvatarError {
    /// Short label for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidUrl(_) => "invalid_url",
            Self::Download(_) => "download",
            Self::Status(_) => "status",
            Self::NotAnImage(_) => "not_an_image",
            Self::TooLarge(_) => "too_large",
            Self::Discord(_) => "discord",
        }
    }
}

pub fn parse_avatar_url(raw: &str) -> Result<reqwest::Url, AvatarError> {
    let trimmed = raw.trim().trim_start_matches('<').trim_end_matches('>');
    let url =
        reqwest::Url::parse(trimmed).map_err(|_| AvatarError::InvalidUrl(trimmed.to_owned()))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(AvatarError::InvalidUrl(trimmed.to_owned()));
    }

    Ok(url)
}

/// File extension for an image content type Discord accepts as an avatar.
pub fn image_extension(content_type: &str) -> Option<&'static str> {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    match mime.as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

pub async fn download_avatar(
    client: &reqwest::Client,
    url: reqwest::Url,
) -> Result<serenity::CreateAttachment, AvatarError> {
    let (bytes, extension) = fetch_image(client, url, MAX_AVATAR_BYTES).await?;

    Ok(serenity::CreateAttachment::bytes(
        bytes,
        format!("avatar.{extension}"),
    ))
}

/// Fetch an image body of at most `limit` bytes, returning it with its file
/// extension.
///
/// The body is streamed so an oversized download is abandoned as soon as it
/// crosses the limit, whether or not the server announced a length.
pub async fn fetch_image(
    client: &reqwest::Client,
    url: reqwest::Url,
    limit: usize,
) -> Result<(Vec<u8>, &'static str), AvatarError> {
    let mut response = client.get(url).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(AvatarError::Status(status));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_owned();
    let Some(extension) = image_extension(&content_type) else {
        return Err(AvatarError::NotAnImage(content_type));
    };

    let announced = response.content_length();
    if let Some(length) = announced
        && length > limit as u64
    {
        return Err(AvatarError::TooLarge(
            usize::try_from(length).unwrap_or(usize::MAX),
        ));
    }

    let mut body = Vec::with_capacity(
        announced.map_or(0, |length| usize::try_from(length).unwrap_or(limit).min(limit)),
    );
    while let Some(chunk) = response.chunk().await? {
        let received = body.len().saturating_add(chunk.len());
        if received > limit {
            return Err(AvatarError::TooLarge(received));
        }
        body.extend_from_slice(&chunk);
    }

    Ok((body, extension))
}

/// Download the image at `raw_url` and set it as the bot's avatar.
pub async fn update_avatar(
    http: &serenity::Http,
    client: &reqwest::Client,
    raw_url: &str,
) -> Result<(), AvatarError> {
    let url = parse_avatar_url(raw_url)?;
    let attachment = download_avatar(client, url).await?;

    let mut current_user = http.get_current_user().await?;
    current_user
        .edit(http, serenity::EditProfile::new().avatar(&attachment))
        .await?;

    Ok(())
}
