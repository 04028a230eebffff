//! Static message catalogue. Queue rows carry markers, never copy;
//! this module is the only place display text lives.
//!
//! Progress-slot variants are keyed by engagement tier: `none` (no lessons
//! finished), `lt3` (fewer than three), `lt5` (fewer than five), `all`.

/// (tier, text) variant set for one progress slot.
pub type VariantSet = [(&'static str, &'static str); 4];

pub const WELCOME_1: &str = "<b>Welcome aboard!</b>\n\n\
Your learning space is ready. The first course is waiting for you — \
tap the app button in our chat to dive in.";

pub const WELCOME_2: &str = "Quick reminder: everything starts in the app. \
Your first module takes about ten minutes, and the best time to do it is now.";

pub const PRO_WELCOME_12M: &str = "<b>Pro access activated — 12 months.</b>\n\n\
All advanced tracks are unlocked. Start with the roadmap in the app so you \
don't miss the live sessions.";

pub const PRO_NEXT_DAY: &str = "Day two of Pro: the strategy track is a good \
place to continue. Your progress syncs automatically.";

pub const ACCESS_ENDED_1: &str = "Your access has ended. Everything you \
finished stays in your profile — and you can pick up right where you left \
off whenever you come back.";

pub const ACCESS_ENDED_2: &str = "Still thinking it over? Your progress is \
saved and the door is open. Renew in the app anytime.";

pub const DAY1_1934: VariantSet = [
    (
        "none",
        "Day one is almost over and your first lesson is still untouched. \
It takes ten minutes — a perfect evening task.",
    ),
    (
        "lt3",
        "Nice start today! A couple of lessons down already. One more before \
bed keeps the streak alive.",
    ),
    (
        "lt5",
        "You're moving fast — most of the first block is done. Tomorrow's \
material builds right on top of it.",
    ),
    (
        "all",
        "First block finished on day one. Seriously impressive. Day two \
unlocks tomorrow morning.",
    ),
];

pub const DAY2_2022: VariantSet = [
    (
        "none",
        "Day two check-in: the first block is still waiting. Ten minutes \
tonight and you're back on track.",
    ),
    (
        "lt3",
        "Day two and a steady pace. The next lesson is shorter than the \
last one — a quick win before the evening ends.",
    ),
    (
        "lt5",
        "Almost through the second block — one push and it's done. The \
practice task tomorrow will feel easy.",
    ),
    (
        "all",
        "Two days, two blocks. You're ahead of the schedule — tomorrow \
brings the first real project.",
    ),
];

pub const DAY3_0828: VariantSet = [
    (
        "none",
        "Morning! Three days in, and the course is still at the start line. \
Begin with lesson one over coffee — it's the shortest.",
    ),
    (
        "lt3",
        "Morning check-in: a few lessons done, the core block ahead. \
Mornings are when most people finish it fastest.",
    ),
    (
        "lt5",
        "Good morning — the finish line of block three is close. Wrap it \
up today and the weekend project is yours.",
    ),
    (
        "all",
        "Three days, three blocks, zero skipped. The advanced track just \
unlocked for you — check the app.",
    ),
];
