//! Site-specific selectors and text matching for zhipin.com.
//!
//! Lists are tried in order; the first selector that matches wins.

use rand::Rng;

pub const LOGIN_BUTTON: &str = ".btn-sign-in, .login-btn";
pub const USER_NAV: &str = ".user-nav, .nav-user";

pub const JOB_CARDS: &[&str] = &[".job-card-wrapper", ".job-card-box", "li.job-card"];

pub const JOB_TITLE: &str = ".job-name, .job-title";
pub const COMPANY_NAME: &str = ".company-name, .comp-name";
pub const JOB_TITLE_LOOSE: &str = r#"[class*="job"]"#;
pub const COMPANY_NAME_LOOSE: &str = r#"[class*="company"]"#;
pub const JOB_LINK: &str = "a";

/// Tags scanned, in order, for the start-chat control.
pub const CHAT_CONTROL_TAGS: &[&str] = &["button", "a"];

pub const GREETING_INPUTS: &[&str] = &[
    r#"textarea[placeholder*="和BOSS"]"#,
    r#"textarea[placeholder*="打个招呼"]"#,
    "textarea.input-area",
    ".chat-input",
    "textarea",
    ".greet-input textarea",
];

pub const SEND_BUTTONS: &[&str] = &[
    "button.btn-send",
    ".btn-send",
    r#"button[type="submit"]"#,
    ".send-btn",
    "button.primary",
];

pub const UNKNOWN_TITLE: &str = "未知职位";
pub const UNKNOWN_COMPANY: &str = "未知公司";

const START_CHAT_LABELS: &[&str] = &["立即沟通", "立即聊天", "开始聊天", "立即应聘"];
const CONTACTED_MARKERS: &[&str] = &["已沟通", "继续沟通"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatLabel {
    /// Control that opens a new conversation.
    Start,
    /// The recruiter was already contacted from this account.
    Contacted,
}

impl ChatLabel {
    /// Classify a control's visible text. Start labels must match exactly.
    pub fn classify(text: &str) -> Option<Self> {
        let text = text.trim();
        if START_CHAT_LABELS.contains(&text) {
            Some(ChatLabel::Start)
        } else if CONTACTED_MARKERS.iter().any(|m| text.contains(m)) {
            Some(ChatLabel::Contacted)
        } else {
            None
        }
    }
}

/// Dedup id for a posting: the last path segment of its link, cut at the
/// first `.` and `?`. `/job_detail/3c9f1e.html?ka=x` gives `3c9f1e`.
pub fn posting_id_from_link(link: &str) -> Option<String> {
    let segment = link.rsplit('/').next()?;
    let id = segment.split('.').next()?.split('?').next()?;
    (!id.is_empty()).then(|| id.to_string())
}

/// Stand-in id for postings without a usable link.
pub fn random_posting_id() -> String {
    rand::thread_rng().gen_range(1_000_000..=9_999_999u32).to_string()
}

pub fn posting_id(link: Option<&str>) -> String {
    link.and_then(posting_id_from_link)
        .unwrap_or_else(random_posting_id)
}
