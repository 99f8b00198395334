//! User-facing copy
//!
//! The bot speaks Ukrainian to its users; backend values (district names,
//! parking options) stay in Polish.

use crate::state_machine::state::{Filters, Listing, Verdict};

pub const GREETING: &str =
    "Привіт, я She 🌙\nЗнайду тобі вигідну оренду в Кракові — без зайвого шуму.";
pub const DISTRICTS_PROMPT: &str = "Обери райони (можна кілька) або пропусти:";
pub const PRICE_PROMPT: &str = "Який максимальний бюджет? (числом, напр. 3500)";
pub const PRICE_INVALID: &str = "Мені треба число типу 3500. Спробуй ще раз 🙂";
pub const ROOMS_PROMPT: &str = "Кімнати?";
pub const PETS_PROMPT: &str = "Тварини ок?";
pub const PARKING_PROMPT: &str = "Паркінг?";
pub const ELEVATOR_PROMPT: &str = "Ліфт важливий?";
pub const SEARCH_STARTED: &str = "Ок, я пірнаю в OLX… 🫧";
pub const FEED_EMPTY: &str = "Поки порожньо. Дай мені хвилинку і спробуй /start ще раз.";
pub const NOTHING_LEFT: &str = "Поки все. Натисни /start — і я знову піду на полювання 🌙";
pub const BACKEND_UNAVAILABLE: &str =
    "Я зараз не дотягнулась до бекенда 😿 Перевір ще раз через хвилину.";
pub const RESTARTED: &str = "Рестарт. Натисни /start 🌙";
pub const NEW_SEARCH_HINT: &str = "Якщо хочеш новий пошук — натисни /start 🌙";

pub fn job_accepted(job_id: &str) -> String {
    format!("Я в роботі. Job: {job_id}")
}

pub fn reaction_toast(verdict: Verdict) -> &'static str {
    match verdict {
        Verdict::Liked => "Лайк ✅",
        Verdict::Skipped => "Скіп ❌",
    }
}

/// Summary shown on the confirm step
pub fn summary(filters: &Filters) -> String {
    let districts = if filters.districts.is_empty() {
        "будь-які".to_string()
    } else {
        filters.districts.join(", ")
    };
    let price = filters
        .price_max
        .map_or_else(|| "без ліміту".to_string(), |max| format!("до {max} zł"));
    let rooms = if filters.rooms.is_empty() {
        "будь-які".to_string()
    } else {
        filters
            .rooms
            .iter()
            .map(|r| r.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let pets = filters.pets.map_or("все одно", |p| p.as_str());
    let parking = if filters.parking.is_empty() {
        "неважливо".to_string()
    } else {
        filters
            .parking
            .iter()
            .map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let elevator = if filters.elevator_required() {
        "Так"
    } else {
        "Все одно"
    };

    format!(
        "Окей, я зловила твій вайб ✨\n\n\
         📍 Райони: {districts}\n\
         💰 Бюджет: {price}\n\
         🚪 Кімнати: {rooms}\n\
         🐕 Тварини: {pets}\n\
         🚗 Паркінг: {parking}\n\
         🛗 Ліфт: {elevator}\n\n\
         Запускаю пошук?"
    )
}

/// Card text for one listing
pub fn listing_card(listing: &Listing) -> String {
    let title = listing
        .title
        .as_deref()
        .filter(|t| !t.is_empty())
        .unwrap_or("Оголошення");
    let location = listing
        .location
        .as_deref()
        .filter(|l| !l.is_empty())
        .unwrap_or("локація не вказана");
    let price = listing
        .price_value
        .filter(|p| *p > 0.0)
        .map_or_else(|| "ціна не вказана".to_string(), |p| format!("{p} zł"));

    format!("🏠 {title}\n📍 {location}\n💰 {price}\n🔗 {}", listing.url)
}
