//! Inline keyboards and the callback payload format
//!
//! Keyboards are transport-neutral: the Telegram adapter converts them into
//! inline markup. Every payload produced here is understood by
//! [`parse_callback`].

use crate::state_machine::state::{
    card_token, is_known_district, Parking, Pets, RoomChoice, Verdict, DISTRICTS,
};
use crate::state_machine::Event;

const CHECK: &str = "✅ ";

/// Rows of buttons attached to a message
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

/// A button with its callback payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub data: String,
}

impl Button {
    fn new(label: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            data: data.into(),
        }
    }

    fn checked(selected: bool, label: &str, data: impl Into<String>) -> Self {
        if selected {
            Self::new(format!("{CHECK}{label}"), data)
        } else {
            Self::new(label, data)
        }
    }
}

impl Keyboard {
    fn new(rows: Vec<Vec<Button>>) -> Self {
        Self { rows }
    }

    /// All buttons, row by row
    #[allow(dead_code)] // Test helper
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }
}

// ============================================================================
// Builders
// ============================================================================

pub fn districts(selected: &[String]) -> Keyboard {
    let mut rows: Vec<Vec<Button>> = DISTRICTS
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|district| {
                    let is_selected = selected.iter().any(|s| s == district);
                    Button::checked(is_selected, district, format!("d:{district}"))
                })
                .collect()
        })
        .collect();
    rows.push(vec![
        Button::new("Пропустити ➜", "d_skip"),
        Button::new("Готово ➜", "d_done"),
    ]);
    Keyboard::new(rows)
}

pub fn rooms() -> Keyboard {
    let row = RoomChoice::ALL
        .into_iter()
        .map(|choice| {
            let label = match choice {
                RoomChoice::One => "1",
                RoomChoice::Two => "2",
                RoomChoice::ThreePlus => "3+",
                RoomChoice::Any => "будь-які",
            };
            Button::new(label, format!("r:{}", choice.code()))
        })
        .collect();
    Keyboard::new(vec![row])
}

pub fn pets(current: Option<Pets>) -> Keyboard {
    Keyboard::new(vec![vec![
        Button::checked(current == Some(Pets::Tak), "Так", "p:Tak"),
        Button::checked(current == Some(Pets::Nie), "Ні", "p:Nie"),
        Button::checked(current.is_none(), "Все одно", "p:any"),
    ]])
}

pub fn parking(selected: &[Parking]) -> Keyboard {
    let options = Parking::ALL
        .into_iter()
        .map(|option| {
            let label = match option {
                Parking::Garage => "Гараж",
                Parking::Guarded => "Охоронюваний",
            };
            Button::checked(
                selected.contains(&option),
                label,
                format!("park:{}", option.code()),
            )
        })
        .collect();
    Keyboard::new(vec![
        options,
        vec![
            Button::new("Не треба ➜", "park_skip"),
            Button::new("Готово ➜", "park_done"),
        ],
    ])
}

pub fn elevator(current: Option<bool>) -> Keyboard {
    let required = current == Some(true);
    Keyboard::new(vec![vec![
        Button::checked(required, "Ліфт must-have", "e:yes"),
        Button::checked(!required, "Все одно", "e:any"),
    ]])
}

pub fn confirm() -> Keyboard {
    Keyboard::new(vec![
        vec![Button::new("🔍 Шукати", "go")],
        vec![Button::new("♻️ Почати заново", "restart")],
    ])
}

pub fn listing(listing_id: &str) -> Keyboard {
    let card = card_token(listing_id);
    Keyboard::new(vec![vec![
        Button::new("❤️ Like", format!("like:{card}")),
        Button::new("❌ Skip", format!("skip:{card}")),
    ]])
}

// ============================================================================
// Parsing
// ============================================================================

/// Turn a button payload back into an event.
///
/// Unknown or malformed payloads yield `None` and are ignored by the caller.
pub fn parse_callback(data: &str) -> Option<Event> {
    match data {
        "d_skip" => return Some(Event::SkipDistricts),
        "d_done" => return Some(Event::DoneDistricts),
        "park_skip" => return Some(Event::SkipParking),
        "park_done" => return Some(Event::DoneParking),
        "go" => return Some(Event::Go),
        "restart" => return Some(Event::Restart),
        _ => {}
    }

    let (prefix, value) = data.split_once(':')?;
    match prefix {
        "d" if is_known_district(value) => Some(Event::ToggleDistrict {
            district: value.to_string(),
        }),
        "r" => RoomChoice::from_code(value).map(|choice| Event::SelectRooms { choice }),
        "p" if value == "any" => Some(Event::SelectPets { pets: None }),
        "p" => Pets::from_code(value).map(|pets| Event::SelectPets { pets: Some(pets) }),
        "park" => Parking::from_code(value).map(|parking| Event::ToggleParking { parking }),
        "e" => match value {
            "yes" => Some(Event::SelectElevator { required: true }),
            "any" => Some(Event::SelectElevator { required: false }),
            _ => None,
        },
        "like" if !value.is_empty() => Some(Event::React {
            card: value.to_string(),
            verdict: Verdict::Liked,
        }),
        "skip" if !value.is_empty() => Some(Event::React {
            card: value.to_string(),
            verdict: Verdict::Skipped,
        }),
        _ => None,
    }
}
