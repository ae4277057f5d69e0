//! Host-independent view model
//!
//! `build` turns a `GameState` snapshot into exactly what the page should
//! show. The DOM layer only copies these values into elements.

use crate::css_percent;
use crate::sim::{GamePhase, GameState};
use crate::tuning::Tuning;

pub const HEADING: &str = "Một Trò Chơi Nhỏ Cho Em 🌷";
pub const START_LABEL: &str = "Bắt Đầu";
pub const PLAY_AGAIN_LABEL: &str = "Chơi Lại";
pub const SCORE_LABEL: &str = "Điểm:";
pub const WAITING_MESSAGE: &str = "Sẵn sàng chưa! Hoa tulip đang tới... 🌷";
pub const TULIP_EMOJI: &str = "🌷";
pub const TULIP_ARIA_LABEL: &str = "Catch tulip";
pub const INVITE_TITLE: &str = "Em Là Valentine Của Anh 💕";
pub const INVITE_MESSAGE: &str =
    "Em đã bắt được tất cả hoa tulip! Tối 14/2 mình đi ăn tối cùng nhau nhé? 🌹";

/// Everything the start screen shows
#[derive(Debug, Clone, PartialEq)]
pub struct StartView {
    /// None when the page says the game was already completed
    pub instructions: Option<Vec<String>>,
    pub button_label: &'static str,
}

/// One tulip button
#[derive(Debug, Clone, PartialEq)]
pub struct TulipView {
    pub id: u32,
    pub left: String,
    pub top: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayingView {
    /// e.g. "3 / 10"
    pub score_text: String,
    /// CSS width of the progress fill
    pub progress_width: String,
    pub tulips: Vec<TulipView>,
    /// Shown while nothing is falling yet
    pub waiting_message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfettiView {
    pub id: u32,
    pub emoji: &'static str,
    pub left: String,
    pub top: String,
    /// CSS animation-delay
    pub delay: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VictoryView {
    pub confetti: Vec<ConfettiView>,
    pub title: &'static str,
    pub message: &'static str,
    pub play_again_label: &'static str,
}

/// Which screen to render
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Start(StartView),
    Playing(PlayingView),
    Victory(VictoryView),
}

impl Screen {
    pub fn phase(&self) -> GamePhase {
        match self {
            Screen::Start(_) => GamePhase::NotStarted,
            Screen::Playing(_) => GamePhase::Playing,
            Screen::Victory(_) => GamePhase::Won,
        }
    }
}

/// Subtitle under the heading, mentions the target
pub fn subtitle(tuning: &Tuning) -> String {
    format!(
        "Hãy bắt {} bông hoa tulip đang rơi để mở món quà đặc biệt!",
        tuning.target_score
    )
}

fn instructions(tuning: &Tuning) -> Vec<String> {
    vec![
        "🌷 Chạm vào những bông hoa tulip đang rơi để bắt chúng".to_string(),
        format!("🎯 Bắt đủ {} bông hoa để chiến thắng", tuning.target_score),
        "⏱️ Đừng để chúng rơi khỏi màn hình nhé!".to_string(),
    ]
}

/// Build the screen for a state snapshot.
///
/// `already_completed` is a hint from the page: it only trims the start
/// screen, it never skips a phase.
pub fn build(state: &GameState, tuning: &Tuning, already_completed: bool) -> Screen {
    match state.phase() {
        GamePhase::NotStarted => Screen::Start(StartView {
            instructions: (!already_completed).then(|| instructions(tuning)),
            button_label: if already_completed {
                PLAY_AGAIN_LABEL
            } else {
                START_LABEL
            },
        }),
        GamePhase::Playing => Screen::Playing(PlayingView {
            score_text: format!("{} / {}", state.score, tuning.target_score),
            progress_width: css_percent(tuning.progress(state.score) * 100.0),
            tulips: state
                .tulips
                .iter()
                .map(|t| TulipView {
                    id: t.id,
                    left: css_percent(t.x),
                    top: css_percent(t.y),
                })
                .collect(),
            waiting_message: state.tulips.is_empty().then_some(WAITING_MESSAGE),
        }),
        GamePhase::Won => Screen::Victory(VictoryView {
            confetti: state
                .confetti
                .iter()
                .map(|c| ConfettiView {
                    id: c.id,
                    emoji: c.emoji,
                    left: css_percent(c.x),
                    top: css_percent(c.y),
                    delay: format!("{:.2}s", c.delay_secs),
                })
                .collect(),
            title: INVITE_TITLE,
            message: INVITE_MESSAGE,
            play_again_label: PLAY_AGAIN_LABEL,
        }),
    }
}
