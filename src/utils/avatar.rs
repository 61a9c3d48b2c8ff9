use serde::{Deserialize, Serialize};

/// DiceBear endpoint; `{style}` and `{seed}` are substituted.
pub const DEFAULT_AVATAR_TEMPLATE: &str = "https://api.dicebear.com/7.x/{style}/svg?seed={seed}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AvatarStyle {
    #[default]
    Adventurer,
    Avataaars,
    Bottts,
    Personas,
    PixelArt,
}

impl AvatarStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvatarStyle::Adventurer => "adventurer",
            AvatarStyle::Avataaars => "avataaars",
            AvatarStyle::Bottts => "bottts",
            AvatarStyle::Personas => "personas",
            AvatarStyle::PixelArt => "pixel-art",
        }
    }
}

impl std::fmt::Display for AvatarStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AvatarStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "adventurer" => Ok(AvatarStyle::Adventurer),
            "avataaars" => Ok(AvatarStyle::Avataaars),
            "bottts" => Ok(AvatarStyle::Bottts),
            "personas" => Ok(AvatarStyle::Personas),
            "pixel-art" => Ok(AvatarStyle::PixelArt),
            other => Err(format!("unknown avatar style '{}'", other)),
        }
    }
}

/// Builds the placeholder image URL for `seed`. Pure: no network access.
pub fn generate_avatar_url(template: &str, seed: &str, style: AvatarStyle) -> String {
    let encoded_seed: String = url::form_urlencoded::byte_serialize(seed.as_bytes()).collect();
    template
        .replace("{style}", style.as_str())
        .replace("{seed}", &encoded_seed)
}

/// Fallback text when no image can be shown.
pub fn initials(name: Option<&str>, username: &str) -> String {
    if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
        let parts: Vec<&str> = name.split_whitespace().collect();
        let letters: String = if parts.len() >= 2 {
            parts[0]
                .chars()
                .take(1)
                .chain(parts[parts.len() - 1].chars().take(1))
                .collect()
        } else {
            name.chars().take(1).collect()
        };
        return letters.to_uppercase();
    }
    username.chars().take(1).collect::<String>().to_uppercase()
}

#[derive(Debug, Clone)]
pub struct AvatarGenerator {
    template: String,
    style: AvatarStyle,
}

impl AvatarGenerator {
    pub fn new(template: impl Into<String>, style: AvatarStyle) -> Self {
        Self {
            template: template.into(),
            style,
        }
    }

    pub fn generate(&self, seed: &str) -> String {
        generate_avatar_url(&self.template, seed, self.style)
    }

    /// Profile picture when present, otherwise the generated avatar for `username`.
    pub fn for_user(&self, profile_picture_url: Option<&str>, username: &str) -> String {
        match profile_picture_url.filter(|url| !url.trim().is_empty()) {
            Some(url) => url.to_string(),
            None => self.generate(username),
        }
    }
}

impl Default for AvatarGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_AVATAR_TEMPLATE, AvatarStyle::default())
    }
}
