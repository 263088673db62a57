//! Draw list generation
//!
//! Turns controller state into a flat list of backend-neutral draw commands
//! in logical screen coordinates. Backends only have to paint them in order.

use glam::Vec2;

use crate::lerp;
use crate::sim::{
    Choice, Mark, Rect, RoundController, SessionPhase, SessionState, Tone, VisualState,
};

/// RGBA, 0.0 - 1.0
pub type Color = [f32; 4];

pub const BACKGROUND: Color = [0.96, 0.95, 0.90, 1.0];
pub const INK: Color = [0.15, 0.15, 0.2, 1.0];
pub const BOX_FILL: Color = [1.0, 1.0, 1.0, 1.0];
pub const CORRECT: Color = [0.3, 0.75, 0.35, 1.0];
pub const INCORRECT: Color = [0.9, 0.3, 0.3, 1.0];
pub const BUTTON: Color = [0.25, 0.45, 0.85, 1.0];
pub const BUTTON_TEXT: Color = [1.0, 1.0, 1.0, 1.0];

/// Ball palette: red, green, blue, yellow, white
pub const BALL_COLORS: [Color; 5] = [
    [0.9, 0.25, 0.25, 1.0],
    [0.25, 0.75, 0.3, 1.0],
    [0.25, 0.45, 0.9, 1.0],
    [0.95, 0.8, 0.2, 1.0],
    [0.97, 0.97, 0.97, 1.0],
];

/// Same color with alpha scaled
pub fn faded(color: Color, alpha: f32) -> Color {
    [color[0], color[1], color[2], color[3] * alpha.clamp(0.0, 1.0)]
}

/// CSS `rgba()` string for canvas backends
pub fn css(color: Color) -> String {
    format!(
        "rgba({}, {}, {}, {:.3})",
        (color[0] * 255.0).round() as u8,
        (color[1] * 255.0).round() as u8,
        (color[2] * 255.0).round() as u8,
        color[3]
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCmd {
    Clear(Color),
    Rect {
        rect: Rect,
        fill: Color,
        stroke: Option<(Color, f32)>,
    },
    Circle {
        center: Vec2,
        radius: f32,
        fill: Color,
    },
    Text {
        text: String,
        pos: Vec2,
        size: f32,
        color: Color,
        align: Align,
    },
}

/// Everything to draw for the current frame
pub fn build_scene(ctrl: &RoundController) -> Vec<DrawCmd> {
    let mut cmds = vec![DrawCmd::Clear(BACKGROUND)];
    let layout = ctrl.layout();

    let Some(session) = ctrl.session() else {
        let title_pos = Vec2::new(layout.screen.x / 2.0, layout.screen.y * 0.3);
        cmds.push(text("Learn Numbers", title_pos, 96.0, INK));
        button(&mut cmds, layout.start_button(), "Play");
        return cmds;
    };

    cmds.push(DrawCmd::Text {
        text: format!("Score: {}", session.score),
        pos: layout.score_pos(),
        size: 48.0,
        color: INK,
        align: Align::Left,
    });
    button(&mut cmds, layout.back_button(), "Back");

    match session.phase {
        SessionPhase::Active => {
            let t = session.transition_progress;
            cmds.push(text(
                &session.prompt_text(),
                Vec2::new(layout.screen.x / 2.0, layout.prompt_y()),
                lerp(48.0, 72.0, t),
                faded(INK, t),
            ));
            for choice in ctrl.choices() {
                push_choice(&mut cmds, choice, t);
            }
            push_feedback(&mut cmds, session, layout.feedback_center());
        }
        SessionPhase::SequenceComplete => {
            let center = layout.screen / 2.0;
            cmds.push(text("You did it!", center - Vec2::new(0.0, 200.0), 110.0, CORRECT));
            cmds.push(text(
                &format!("Final score: {}", session.score),
                center - Vec2::new(0.0, 40.0),
                64.0,
                INK,
            ));
            button(&mut cmds, layout.next_button(), "Next Level");
        }
    }
    cmds
}

fn text(text: &str, pos: Vec2, size: f32, color: Color) -> DrawCmd {
    DrawCmd::Text {
        text: text.to_string(),
        pos,
        size,
        color,
        align: Align::Center,
    }
}

fn button(cmds: &mut Vec<DrawCmd>, rect: Rect, label: &str) {
    cmds.push(DrawCmd::Rect {
        rect,
        fill: BUTTON,
        stroke: None,
    });
    cmds.push(text(label, rect.center() + Vec2::new(0.0, 14.0), 40.0, BUTTON_TEXT));
}

fn push_choice(cmds: &mut Vec<DrawCmd>, choice: &Choice, fade_in: f32) {
    let alpha = choice.opacity * fade_in;
    let (border, width) = match choice.visual {
        VisualState::HighlightCorrect => (CORRECT, 12.0),
        VisualState::HighlightIncorrect => (INCORRECT, 12.0),
        VisualState::Normal | VisualState::FadingOut => (INK, 4.0),
    };
    cmds.push(DrawCmd::Rect {
        rect: choice.bounds,
        fill: faded(BOX_FILL, alpha),
        stroke: Some((faded(border, alpha), width)),
    });

    let origin = choice.bounds.min;
    for mark in choice.render_intent() {
        cmds.push(match mark {
            Mark::Numeral {
                value,
                center,
                size,
            } => text(
                &value.to_string(),
                origin + center + Vec2::new(0.0, size * 0.35),
                size,
                faded(INK, alpha),
            ),
            Mark::Ball {
                center,
                radius,
                palette,
            } => DrawCmd::Circle {
                center: origin + center,
                radius,
                fill: faded(BALL_COLORS[palette as usize % BALL_COLORS.len()], alpha),
            },
        });
    }
}

fn push_feedback(cmds: &mut Vec<DrawCmd>, session: &SessionState, center: Vec2) {
    let Some(feedback) = &session.feedback else {
        return;
    };
    let color = match feedback.tone {
        Tone::Positive => CORRECT,
        Tone::Negative => INCORRECT,
    };
    // Slides up into place as it fades in
    let offset = lerp(40.0, 0.0, feedback.alpha);
    let rect = Rect::from_center(center + Vec2::new(0.0, offset), Vec2::new(640.0, 120.0));
    cmds.push(DrawCmd::Rect {
        rect,
        fill: faded(color, feedback.alpha),
        stroke: None,
    });
    cmds.push(text(
        &feedback.text,
        rect.center() + Vec2::new(0.0, 20.0),
        56.0,
        faded(BUTTON_TEXT, feedback.alpha),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::{Cue, VirtualMixer};
    use crate::consts::MAX_LEVEL;
    use crate::settings::Settings;
    use crate::sim::{InputEvent, TickInput};
    use std::time::Duration;

    fn controller() -> (RoundController, VirtualMixer) {
        let settings = Settings {
            seed: Some(3),
            ..Settings::default()
        };
        let mixer = VirtualMixer::with_cues(&Cue::all(MAX_LEVEL), Duration::from_millis(300));
        (RoundController::new(&settings).unwrap(), mixer)
    }

    fn texts(cmds: &[DrawCmd]) -> Vec<&str> {
        cmds.iter()
            .filter_map(|c| match c {
                DrawCmd::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_title_screen() {
        let (ctrl, _) = controller();
        let cmds = build_scene(&ctrl);
        assert_eq!(cmds[0], DrawCmd::Clear(BACKGROUND));
        assert_eq!(texts(&cmds), vec!["Learn Numbers", "Play"]);
    }

    #[test]
    fn test_round_scene() {
        let (mut ctrl, mut mixer) = controller();
        ctrl.start_session(&mut mixer).unwrap();
        let cmds = build_scene(&ctrl);
        let labels = texts(&cmds);
        assert!(labels.contains(&"Score: 0"));
        assert!(labels.contains(&"Point to one"));
        for n in ["1", "2", "3", "4", "5"] {
            assert!(labels.contains(&n));
        }

        let target = ctrl.choices().iter().find(|c| c.value() == 1).unwrap();
        let pos = target.bounds.center();
        let click = TickInput {
            events: vec![InputEvent::PointerDown(pos)],
            idle_mode: false,
        };
        ctrl.tick(&click, &mut mixer, Duration::from_millis(500)).unwrap();
        let cmds = build_scene(&ctrl);
        assert!(texts(&cmds).contains(&"Good! +10 points"));
        assert!(cmds.iter().any(|c| matches!(
            c,
            DrawCmd::Rect { stroke: Some((color, _)), .. } if color[..3] == CORRECT[..3]
        )));
    }

    #[test]
    fn test_css_color() {
        assert_eq!(css([1.0, 0.0, 0.5, 0.25]), "rgba(255, 0, 128, 0.250)");
        assert_eq!(faded(INK, 0.5)[3], 0.5);
    }
}
