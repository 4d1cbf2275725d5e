//! Label keywords that announce each field.
//!
//! Keywords are stored lower-case and matched case-insensitively. Each field
//! has one canonical set covering the Vietnamese label, its unaccented form,
//! the English label and the OCR misreadings seen in practice. Keywords of
//! three characters or fewer only match as whole words, so `so` does not
//! fire inside `sonla` and `tên` does not fire inside `têns`.

use lazy_static::lazy_static;
use regex::Regex;

/// Keywords up to this many characters require word boundaries.
const SHORT_KEYWORD_LEN: usize = 3;

/// A compiled set of label keywords.
#[derive(Debug)]
pub struct KeywordSet {
    matcher: Regex,
}

impl KeywordSet {
    /// Compile a keyword set. Longer keywords are tried first.
    pub fn new(keywords: &'static [&'static str]) -> Self {
        let mut ordered: Vec<&str> = keywords.to_vec();
        ordered.sort_by_key(|k| std::cmp::Reverse(k.chars().count()));

        let alternatives: Vec<String> = ordered.iter().map(|k| keyword_pattern(k)).collect();
        let matcher = Regex::new(&format!("(?i)(?:{})", alternatives.join("|")))
            .expect("keyword patterns are escaped");

        Self { matcher }
    }

    /// Whether any keyword occurs in `line`.
    pub fn matches(&self, line: &str) -> bool {
        self.matcher.is_match(line)
    }

    /// Remove every keyword occurrence from `line`, keeping the rest as is.
    pub fn strip(&self, line: &str) -> String {
        self.matcher.replace_all(line, "").into_owned()
    }
}

fn keyword_pattern(keyword: &str) -> String {
    let escaped = regex::escape(keyword);
    if keyword.chars().count() > SHORT_KEYWORD_LEN {
        return escaped;
    }

    let starts_alnum = keyword.chars().next().is_some_and(char::is_alphanumeric);
    let ends_alnum = keyword.chars().last().is_some_and(char::is_alphanumeric);
    format!(
        "{}{}{}",
        if starts_alnum { r"\b" } else { "" },
        escaped,
        if ends_alnum { r"\b" } else { "" }
    )
}

const FULL_NAME_KEYWORDS: &[&str] = &[
    "họ và tên",
    "ho và tên",
    "ho va ten",
    "họ tên",
    "full name",
    "tên",
];

const DATE_OF_BIRTH_KEYWORDS: &[&str] =
    &["ngày sinh", "ngay sinh", "date of birth", "date of bith"];

const SEX_KEYWORDS: &[&str] = &["giới tính", "gioi tinh", "sex"];

const DATE_OF_ISSUE_KEYWORDS: &[&str] = &["ngày cấp", "ngay cap", "date of issue"];

const DATE_OF_EXPIRY_KEYWORDS: &[&str] =
    &["có giá trị đến", "co gia tri den", "date of expiry"];

const DOCUMENT_NUMBER_KEYWORDS: &[&str] = &[
    "số hộ chiếu",
    "so ho chieu",
    "passport no",
    "số giấy phép",
    "số căn cước",
    "document no",
];

// Citizen cards print the number under a bare "Số / No." label.
const CITIZEN_NUMBER_KEYWORDS: &[&str] = &[
    "số hộ chiếu",
    "so ho chieu",
    "passport no",
    "số giấy phép",
    "số căn cước",
    "document no",
    "số",
    "so",
    "no.",
];

const PLACE_OF_BIRTH_KEYWORDS: &[&str] = &[
    "nơi sinh",
    "noi sinh",
    "ngi sinh",
    "ni sinh",
    "place of birth",
];

const ID_CARD_NUMBER_KEYWORDS: &[&str] = &["số cmnd", "so cmnd", "cmnd", "id card"];

const ADDRESS_KEYWORDS: &[&str] = &[
    "nơi thường trú",
    "nơi thuờng trú",
    "noi thuong tru",
    "noi thuờng trú",
    "place of residence",
    "địa chỉ",
    "dia chi",
    "address",
];

const LICENSE_CLASS_KEYWORDS: &[&str] = &["hạng", "hang", "class"];

const PLACE_OF_ORIGIN_KEYWORDS: &[&str] = &[
    "quê quán",
    "que quan",
    "place of origin",
    "place of oigin",
    "place of onigin",
];

const NATIONALITY_KEYWORDS: &[&str] = &["quốc tịch", "quoc tich", "nationality", "nationalfty"];

lazy_static! {
    pub static ref FULL_NAME: KeywordSet = KeywordSet::new(FULL_NAME_KEYWORDS);
    pub static ref DATE_OF_BIRTH: KeywordSet = KeywordSet::new(DATE_OF_BIRTH_KEYWORDS);
    pub static ref SEX: KeywordSet = KeywordSet::new(SEX_KEYWORDS);
    pub static ref DATE_OF_ISSUE: KeywordSet = KeywordSet::new(DATE_OF_ISSUE_KEYWORDS);
    pub static ref DATE_OF_EXPIRY: KeywordSet = KeywordSet::new(DATE_OF_EXPIRY_KEYWORDS);
    pub static ref DOCUMENT_NUMBER: KeywordSet = KeywordSet::new(DOCUMENT_NUMBER_KEYWORDS);
    pub static ref CITIZEN_NUMBER: KeywordSet = KeywordSet::new(CITIZEN_NUMBER_KEYWORDS);
    pub static ref PLACE_OF_BIRTH: KeywordSet = KeywordSet::new(PLACE_OF_BIRTH_KEYWORDS);
    pub static ref ID_CARD_NUMBER: KeywordSet = KeywordSet::new(ID_CARD_NUMBER_KEYWORDS);
    pub static ref ADDRESS: KeywordSet = KeywordSet::new(ADDRESS_KEYWORDS);
    pub static ref LICENSE_CLASS: KeywordSet = KeywordSet::new(LICENSE_CLASS_KEYWORDS);
    pub static ref PLACE_OF_ORIGIN: KeywordSet = KeywordSet::new(PLACE_OF_ORIGIN_KEYWORDS);
    pub static ref NATIONALITY: KeywordSet = KeywordSet::new(NATIONALITY_KEYWORDS);
}
