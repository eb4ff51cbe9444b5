//! Color themes and status color helpers.

use crate::notifications::NotificationLevel;
use leadpilot_core::{CampaignStatus, LeadStatus, UsageLevel};
use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    pub bg: Color,
    pub bg_highlight: Color,
    pub primary: Color,
    pub primary_dim: Color,
    pub secondary: Color,
    pub success: Color,
    pub warning: Color,
    pub error: Color,
    pub info: Color,
    pub text: Color,
    pub text_dim: Color,
    pub border: Color,
    pub border_focus: Color,
}

impl Theme {
    pub fn by_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::dark()),
            "light" => Some(Self::light()),
            _ => None,
        }
    }

    pub fn dark() -> Self {
        Self {
            bg: Color::Rgb(15, 17, 26),
            bg_highlight: Color::Rgb(38, 42, 60),
            primary: Color::Rgb(10, 102, 194),
            primary_dim: Color::Rgb(60, 90, 130),
            secondary: Color::Rgb(112, 181, 249),
            success: Color::Rgb(46, 204, 113),
            warning: Color::Rgb(241, 196, 15),
            error: Color::Rgb(231, 76, 60),
            info: Color::Rgb(112, 181, 249),
            text: Color::Rgb(236, 239, 244),
            text_dim: Color::Rgb(136, 142, 160),
            border: Color::Rgb(68, 72, 90),
            border_focus: Color::Rgb(10, 102, 194),
        }
    }

    pub fn light() -> Self {
        Self {
            bg: Color::Rgb(250, 250, 252),
            bg_highlight: Color::Rgb(222, 230, 242),
            primary: Color::Rgb(10, 102, 194),
            primary_dim: Color::Rgb(96, 125, 160),
            secondary: Color::Rgb(0, 65, 130),
            success: Color::Rgb(22, 130, 70),
            warning: Color::Rgb(176, 120, 0),
            error: Color::Rgb(190, 40, 40),
            info: Color::Rgb(0, 65, 130),
            text: Color::Rgb(24, 26, 32),
            text_dim: Color::Rgb(100, 104, 116),
            border: Color::Rgb(190, 194, 204),
            border_focus: Color::Rgb(10, 102, 194),
        }
    }
}

pub fn lead_status_color(status: &LeadStatus, theme: &Theme) -> Color {
    match status {
        LeadStatus::Pending => theme.text_dim,
        LeadStatus::Contacted | LeadStatus::Sent => theme.info,
        LeadStatus::Replied | LeadStatus::Connected => theme.success,
        LeadStatus::Failed => theme.error,
        LeadStatus::Other(_) => theme.text_dim,
    }
}

pub fn campaign_status_color(status: &CampaignStatus, theme: &Theme) -> Color {
    match status {
        CampaignStatus::Active => theme.success,
        CampaignStatus::Paused => theme.warning,
        CampaignStatus::Completed => theme.info,
        CampaignStatus::Draft | CampaignStatus::Other(_) => theme.text_dim,
    }
}

pub fn usage_color(level: UsageLevel, theme: &Theme) -> Color {
    match level {
        UsageLevel::Normal => theme.success,
        UsageLevel::Approaching => theme.warning,
        UsageLevel::Reached => theme.error,
    }
}

pub fn notification_color(level: NotificationLevel, theme: &Theme) -> Color {
    match level {
        NotificationLevel::Info => theme.info,
        NotificationLevel::Warning => theme.warning,
        NotificationLevel::Error => theme.error,
        NotificationLevel::Success => theme.success,
    }
}
