//! Constants and configuration values for clientprint
//!
//! Centralizes the fixed values that define fingerprint output. Changing any of
//! these changes every fingerprint computed afterwards, so they live in one place.

/// Exact fingerprint (MurmurHash3 x86_32) parameters
pub mod exact {
    /// Seed used by every orchestrated fingerprint
    pub const DEFAULT_SEED: u32 = 256;

    /// Multiplier applied to each 4-byte block before rotation
    pub const C1: u32 = 0xcc9e_2d51;

    /// Multiplier applied to each 4-byte block after rotation
    pub const C2: u32 = 0x1b87_3593;

    /// Additive constant of the per-block state mix
    pub const MIX_ADD: u32 = 0xe654_6b64;

    /// First avalanche multiplier
    pub const FMIX_1: u32 = 0x85eb_ca6b;

    /// Second avalanche multiplier
    pub const FMIX_2: u32 = 0xc2b2_ae35;
}

/// Fuzzy digest (CTPH) parameters
pub mod ctph {
    /// FNV-1 prime for the per-chunk accumulators
    pub const HASH_PRIME: u32 = 0x0100_0193;

    /// FNV-1 initial value for the per-chunk accumulators
    pub const HASH_INIT: u32 = 0x2802_1967;

    /// Alphabet used both for signature characters and the block-size prefix
    pub const ALPHABET: &[u8; 64] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

    /// Width of the rolling-hash window in bytes
    pub const ROLLING_WINDOW: usize = 7;

    /// Smallest block size; trigger values are `MIN_BLOCK_SIZE << exponent`
    pub const MIN_BLOCK_SIZE: u64 = 3;

    /// Floor for the initial block-size exponent
    pub const MIN_BLOCK_EXPONENT: u32 = 3;

    /// Largest exponent whose block size still fits in a u64
    pub const MAX_BLOCK_EXPONENT: u32 = MIN_BLOCK_SIZE.leading_zeros();

    /// Target number of chunks per signature used to pick the initial exponent
    pub const CHUNKS_PER_SIGNATURE: f64 = 64.0;

    /// First signature must reach this length before the block size stops shrinking
    pub const MIN_SIGNATURE_LEN: usize = 32;

    /// Field separator inside a digest string
    pub const FIELD_SEPARATOR: char = ':';

    /// Only this many leading signature characters take part in a comparison
    pub const MAX_COMPARED_SIGNATURE_LEN: usize = 1024;
}

/// Key assembly
pub mod key {
    /// Separator placed after (or between) datapoint strings
    pub const SEPARATOR: char = '|';

    /// Separator used inside list-valued datapoints (plugins, fonts, MIME types)
    pub const LIST_SEPARATOR: &str = ", ";

    /// Text used for a datapoint whose collector produced no value
    pub const UNDEFINED: &str = "undefined";
}

/// Fuzzy matching
pub mod matching {
    /// Minimum similarity (0-100) for two digests to be treated as the same client
    pub const DEFAULT_MATCH_THRESHOLD: f64 = 90.0;
}

/// Size limits
pub mod limits {
    /// Settings files larger than this are rejected before parsing
    pub const MAX_SETTINGS_FILE_SIZE: u64 = 1024 * 1024;

    /// Signal profiles carry a canvas data URL, so they get more room
    pub const MAX_PROFILE_FILE_SIZE: u64 = 8 * 1024 * 1024;
}

/// Configuration paths
pub mod paths {
    use std::path::PathBuf;

    /// Directory name under the user configuration directory
    pub const CONFIG_DIR_NAME: &str = "clientprint";

    /// Settings file name
    pub const SETTINGS_FILE: &str = "settings.json";

    /// User configuration directory (`$XDG_CONFIG_HOME/clientprint` or platform equivalent)
    pub fn user_config_dir() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME))
    }
}

/// Stock font candidates probed by the font-list collector, in probe order
pub mod fonts {
    pub const DEFAULT_FONTS: &[&str] = &[
        "Abadi MT Condensed Light", "Adobe Fangsong Std", "Adobe Hebrew", "Adobe Ming Std",
        "Agency FB", "Aharoni", "Andalus", "Angsana New", "AngsanaUPC", "Aparajita", "Arab",
        "Arabic Transparent", "Arabic Typesetting", "Arial Baltic", "Arial Black", "Arial CE",
        "Arial CYR", "Arial Greek", "Arial TUR", "Arial", "Batang", "BatangChe", "Bauhaus 93",
        "Bell MT", "Bitstream Vera Serif", "Bodoni MT", "Bookman Old Style", "Braggadocio",
        "Broadway", "Browallia New", "BrowalliaUPC", "Calibri Light", "Calibri",
        "Californian FB", "Cambria Math", "Cambria", "Candara", "Castellar", "Casual",
        "Centaur", "Century Gothic", "Chalkduster", "Colonna MT", "Comic Sans MS", "Consolas",
        "Constantia", "Copperplate Gothic Light", "Corbel", "Cordia New", "CordiaUPC",
        "Courier New Baltic", "Courier New CE", "Courier New CYR", "Courier New Greek",
        "Courier New TUR", "Courier New", "DFKai-SB", "DaunPenh", "David",
        "DejaVu LGC Sans Mono", "Desdemona", "DilleniaUPC", "DokChampa", "Dotum", "DotumChe",
        "Ebrima", "Engravers MT", "Eras Bold ITC", "Estrangelo Edessa", "EucrosiaUPC",
        "Euphemia", "Eurostile", "FangSong", "Forte", "FrankRuehl", "Franklin Gothic Heavy",
        "Franklin Gothic Medium", "FreesiaUPC", "French Script MT", "Gabriola", "Gautami",
        "Georgia", "Gigi", "Gisha", "Goudy Old Style", "Gulim", "GulimChe", "GungSeo",
        "Gungsuh", "GungsuhChe", "Haettenschweiler", "Harrington", "Hei S", "HeiT",
        "Heisei Kaku Gothic", "Hiragino Sans GB", "Impact", "Informal Roman", "IrisUPC",
        "Iskoola Pota", "JasmineUPC", "KacstOne", "KaiTi", "Kalinga", "Kartika", "Khmer UI",
        "Kino MT", "KodchiangUPC", "Kokila", "Kozuka Gothic Pr6N", "Lao UI", "Latha",
        "Leelawadee", "Levenim MT", "LilyUPC", "Lohit Gujarati", "Loma", "Lucida Bright",
        "Lucida Console", "Lucida Fax", "Lucida Sans Unicode", "MS Gothic", "MS Mincho",
        "MS PGothic", "MS PMincho", "MS Reference Sans Serif", "MS UI Gothic", "MV Boli",
        "Magneto", "Malgun Gothic", "Mangal", "Marlett", "Matura MT Script Capitals",
        "Meiryo UI", "Meiryo", "Menlo", "Microsoft Himalaya", "Microsoft JhengHei",
        "Microsoft New Tai Lue", "Microsoft PhagsPa", "Microsoft Sans Serif",
        "Microsoft Tai Le", "Microsoft Uighur", "Microsoft YaHei", "Microsoft Yi Baiti",
        "MingLiU", "MingLiU-ExtB", "MingLiU_HKSCS", "MingLiU_HKSCS-ExtB", "Miriam Fixed",
        "Miriam", "Mongolian Baiti", "MoolBoran", "NSimSun", "Narkisim", "News Gothic MT",
        "Niagara Solid", "Nyala", "PMingLiU", "PMingLiU-ExtB", "Palace Script MT",
        "Palatino Linotype", "Papyrus", "Perpetua", "Plantagenet Cherokee", "Playbill",
        "Prelude Bold", "Prelude Condensed Bold", "Prelude Condensed Medium", "Prelude Medium",
        "PreludeCompressedWGL Black", "PreludeCompressedWGL Bold",
        "PreludeCompressedWGL Light", "PreludeCompressedWGL Medium",
        "PreludeCondensedWGL Black", "PreludeCondensedWGL Bold", "PreludeCondensedWGL Light",
        "PreludeCondensedWGL Medium", "PreludeWGL Black", "PreludeWGL Bold",
        "PreludeWGL Light", "PreludeWGL Medium", "Raavi", "Rachana", "Rockwell", "Rod",
        "Sakkal Majalla", "Sawasdee", "Script MT Bold", "Segoe Print", "Segoe Script",
        "Segoe UI Light", "Segoe UI Semibold", "Segoe UI Symbol", "Segoe UI", "Shonar Bangla",
        "Showcard Gothic", "Shruti", "SimHei", "SimSun", "SimSun-ExtB",
        "Simplified Arabic Fixed", "Simplified Arabic", "Snap ITC", "Sylfaen", "Symbol",
        "Tahoma", "Times New Roman Baltic", "Times New Roman CE", "Times New Roman CYR",
        "Times New Roman Greek", "Times New Roman TUR", "Times New Roman", "TlwgMono",
        "Traditional Arabic", "Trebuchet MS", "Tunga", "Tw Cen MT Condensed Extra Bold",
        "Ubuntu", "Umpush", "Univers", "Utopia", "Utsaah", "Vani", "Verdana", "Vijaya",
        "Vladimir Script", "Vrinda", "Webdings", "Wide Latin", "Wingdings",    ];
}
