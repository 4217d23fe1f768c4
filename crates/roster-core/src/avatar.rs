#![forbid(unsafe_code)]

//! Initials avatars.
//!
//! The list core only stores and passes an [`AvatarRef`] around. Turning it
//! into an image is the presentation layer's business: [`AvatarRef::to_data_uri`]
//! renders a 40x40 SVG badge and base64-encodes it into a `data:` URI on
//! demand; nothing is rendered at generation time.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

/// Badge edge length in pixels.
const AVATAR_SIZE: u32 = 40;

/// Opaque reference to a generated avatar image.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AvatarRef {
    initials: String,
    hue: i32,
}

/// Produces avatar references from display names.
pub trait AvatarProvider {
    fn avatar_for(&self, name: &str) -> AvatarRef;
}

/// Default provider: initials on a name-seeded pastel background.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitialsAvatars;

impl AvatarProvider for InitialsAvatars {
    fn avatar_for(&self, name: &str) -> AvatarRef {
        AvatarRef::for_name(name)
    }
}

impl AvatarRef {
    /// Build the avatar for a display name.
    #[must_use]
    pub fn for_name(name: &str) -> Self {
        Self {
            initials: initials(name),
            hue: name_hue(name),
        }
    }

    /// Up to two uppercase initials.
    #[must_use]
    pub fn initials(&self) -> &str {
        &self.initials
    }

    /// Background hue in degrees. May be negative; CSS wraps it.
    #[must_use]
    pub fn hue(&self) -> i32 {
        self.hue
    }

    /// CSS color for the badge background.
    #[must_use]
    pub fn background(&self) -> String {
        format!("hsl({}, 60%, 70%)", self.hue)
    }

    /// Render the badge as an SVG document.
    #[must_use]
    pub fn to_svg(&self) -> String {
        let size = AVATAR_SIZE;
        let radius = size / 2;
        format!(
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {size} {size}"><rect width="{size}" height="{size}" fill="{fill}" rx="{radius}" ry="{radius}"/><text x="50%" y="50%" dominant-baseline="middle" text-anchor="middle" fill="#ffffff" font-family="Arial, sans-serif" font-size="16px" font-weight="bold">{initials}</text></svg>"##,
            fill = self.background(),
            initials = xml_escape(&self.initials),
        )
    }

    /// Render the badge as a `data:image/svg+xml;base64,...` URI.
    #[must_use]
    pub fn to_data_uri(&self) -> String {
        format!("data:image/svg+xml;base64,{}", STANDARD.encode(self.to_svg()))
    }
}

/// First character of each space-separated word, uppercased, first two kept.
fn initials(name: &str) -> String {
    let firsts: String = name.split(' ').filter_map(|word| word.chars().next()).collect();
    firsts.to_uppercase().chars().take(2).collect()
}

/// `hash = c + (hash << 5) - hash` over UTF-16 code units.
///
/// The shift wraps at 32 bits while the subtraction does not, so the running
/// value is kept in `i64`. The remainder keeps the sign of the hash.
fn name_hue(name: &str) -> i32 {
    let mut hash: i64 = 0;
    for unit in name.encode_utf16() {
        let shifted = (hash as i32).wrapping_shl(5);
        hash = i64::from(unit) + i64::from(shifted) - hash;
    }
    (hash % 360) as i32
}

fn xml_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_take_first_two_words() {
        assert_eq!(AvatarRef::for_name("ada lovelace").initials(), "AL");
        assert_eq!(AvatarRef::for_name("Mary Ann Evans").initials(), "MA");
        assert_eq!(AvatarRef::for_name("Cher").initials(), "C");
    }

    #[test]
    fn empty_words_are_skipped() {
        assert_eq!(AvatarRef::for_name("  Grace  Hopper").initials(), "GH");
        assert_eq!(AvatarRef::for_name("").initials(), "");
    }

    #[test]
    fn hue_is_stable_and_bounded() {
        let a = AvatarRef::for_name("Grace Hopper");
        let b = AvatarRef::for_name("Grace Hopper");
        assert_eq!(a, b);
        assert!(a.hue() > -360 && a.hue() < 360);
    }

    #[test]
    fn hue_matches_reference_hash() {
        // "ab": 97 -> 97, then 98 + (97 << 5) - 97 = 3105, 3105 % 360 = 225
        assert_eq!(name_hue("ab"), 225);
        assert_eq!(name_hue(""), 0);
    }

    #[test]
    fn data_uri_wraps_base64_svg() {
        let avatar = AvatarRef::for_name("Alan Turing");
        let uri = avatar.to_data_uri();
        let payload = uri
            .strip_prefix("data:image/svg+xml;base64,")
            .expect("data uri prefix");
        let svg = String::from_utf8(STANDARD.decode(payload).unwrap()).unwrap();
        assert_eq!(svg, avatar.to_svg());
        assert!(svg.contains(">AT</text>"));
        assert!(svg.contains(&avatar.background()));
    }

    #[test]
    fn provider_delegates_to_for_name() {
        assert_eq!(
            InitialsAvatars.avatar_for("Edsger Dijkstra"),
            AvatarRef::for_name("Edsger Dijkstra")
        );
    }
}
