use super::models::FacebookProduct;

/// Collapses Facebook's detailed product codes into the stored product set.
///
/// Total: unknown, empty or missing codes become `OTHER`.
pub fn map_facebook_product(raw: Option<&str>) -> FacebookProduct {
    let Some(raw) = raw else {
        return FacebookProduct::Other;
    };
    match raw.trim() {
        "FB_MUSIC_STICKER" => FacebookProduct::FbMusicSticker,
        "FB_REELS" | "FB_REELS_SFV" | "FB_REELS_LFV" => FacebookProduct::FbReels,
        "FB_UGC" | "FB_UGC_LIVE" => FacebookProduct::FbUgc,
        "FB_PROFILE" | "FB_COMPOSER" => FacebookProduct::FbProfile,
        "IG_MUSIC_STICKER" => FacebookProduct::IgMusicSticker,
        "IG_REELS" => FacebookProduct::IgReels,
        "IG_UGC" | "IG_UGC_LIVE" => FacebookProduct::IgUgc,
        "IG_MUSIC_ON_PROFILE" | "IG_MUSIC_ON_FEED" => FacebookProduct::IgMusicOnProfile,
        "FB_FROM_IG_CROSSPOST"
        | "FB_FROM_IG_CROSSPOST_REELS"
        | "IG_FROM_FB_CROSSPOST_REELS"
        | "IG_FROM_FB_CROSSPOST_STORY"
        | "TH_FROM_IG_CROSSPOST_REELS" => FacebookProduct::Crosspost,
        _ => FacebookProduct::Other,
    }
}
