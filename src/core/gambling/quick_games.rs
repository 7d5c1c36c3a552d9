// Single-roll games with no session state: coinflip, dice, lucky number and
// the color wheel. All of them take the RNG as a parameter so the outcomes
// are deterministic under test.

use rand::Rng;
use std::fmt;

// ============================================================================
// COINFLIP
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinSide {
    Heads,
    Tails,
}

impl CoinSide {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "heads" | "head" | "h" => Some(CoinSide::Heads),
            "tails" | "tail" | "t" => Some(CoinSide::Tails),
            _ => None,
        }
    }
}

impl fmt::Display for CoinSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoinSide::Heads => write!(f, "Heads"),
            CoinSide::Tails => write!(f, "Tails"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CoinflipOutcome {
    pub landed: CoinSide,
    /// Credits owed back; the bet was already collected.
    pub payout: i64,
}

/// Fair coin, even money.
pub fn coinflip(rng: &mut impl Rng, call: CoinSide, bet: i64) -> CoinflipOutcome {
    let landed = if rng.gen_bool(0.5) {
        CoinSide::Heads
    } else {
        CoinSide::Tails
    };
    let payout = if landed == call { bet * 2 } else { 0 };
    CoinflipOutcome { landed, payout }
}

// ============================================================================
// DICE
// ============================================================================

/// Payout multiplier for calling a 2d6 total exactly, derived from the true
/// odds of each total.
pub fn dice_multiplier(total: u32) -> f64 {
    match total {
        2 | 12 => 36.0,
        3 | 11 => 18.0,
        4 | 10 => 12.0,
        5 | 9 => 9.0,
        6 | 8 => 7.2,
        7 => 6.0,
        _ => 0.0,
    }
}

#[derive(Debug, Clone)]
pub struct DiceOutcome {
    pub die_one: u32,
    pub die_two: u32,
    pub total: u32,
    pub payout: i64,
}

/// Roll 2d6; an exact call on the total pays by the odds table.
pub fn dice_roll(rng: &mut impl Rng, call: u32, bet: i64) -> DiceOutcome {
    let die_one = rng.gen_range(1..=6);
    let die_two = rng.gen_range(1..=6);
    let total = die_one + die_two;
    let payout = if total == call {
        (bet as f64 * dice_multiplier(total)).floor() as i64
    } else {
        0
    };
    DiceOutcome {
        die_one,
        die_two,
        total,
        payout,
    }
}

// ============================================================================
// LUCKY NUMBER
// ============================================================================

#[derive(Debug, Clone)]
pub struct LuckyNumberOutcome {
    pub drawn: u32,
    pub difference: u32,
    pub multiplier: f64,
    pub payout: i64,
}

/// Multiplier by distance from the drawn number.
pub fn lucky_multiplier(difference: u32) -> f64 {
    match difference {
        0 => 50.0,
        1..=5 => 10.0,
        6..=10 => 5.0,
        11..=20 => 2.0,
        _ => 0.0,
    }
}

/// Pick 1-100, the house draws 1-100; closeness pays in tiers.
pub fn lucky_number(rng: &mut impl Rng, call: u32, bet: i64) -> LuckyNumberOutcome {
    let drawn = rng.gen_range(1..=100);
    let difference = call.abs_diff(drawn);
    let multiplier = lucky_multiplier(difference);
    let payout = (bet as f64 * multiplier).floor() as i64;
    LuckyNumberOutcome {
        drawn,
        difference,
        multiplier,
        payout,
    }
}

// ============================================================================
// COLOR WHEEL
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelColor {
    Red,
    Yellow,
    Green,
    Blue,
    Purple,
}

impl WheelColor {
    pub const ALL: [WheelColor; 5] = [
        WheelColor::Red,
        WheelColor::Yellow,
        WheelColor::Green,
        WheelColor::Blue,
        WheelColor::Purple,
    ];

    /// Chance of the wheel landing here, out of 100.
    pub fn weight(self) -> u32 {
        match self {
            WheelColor::Red => 40,
            WheelColor::Yellow => 30,
            WheelColor::Green => 20,
            WheelColor::Blue => 8,
            WheelColor::Purple => 2,
        }
    }

    /// Payout multiplier when the wheel lands on the called color. Rarer
    /// colors pay more.
    pub fn multiplier(self) -> i64 {
        match self {
            WheelColor::Red => 2,
            WheelColor::Yellow => 3,
            WheelColor::Green => 4,
            WheelColor::Blue => 10,
            WheelColor::Purple => 50,
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "red" => Some(WheelColor::Red),
            "yellow" => Some(WheelColor::Yellow),
            "green" => Some(WheelColor::Green),
            "blue" => Some(WheelColor::Blue),
            "purple" => Some(WheelColor::Purple),
            _ => None,
        }
    }
}

impl fmt::Display for WheelColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WheelColor::Red => write!(f, "Red"),
            WheelColor::Yellow => write!(f, "Yellow"),
            WheelColor::Green => write!(f, "Green"),
            WheelColor::Blue => write!(f, "Blue"),
            WheelColor::Purple => write!(f, "Purple"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColorWheelOutcome {
    pub landed: WheelColor,
    pub payout: i64,
}

/// Spin the weighted wheel; a matching call pays the landed color's
/// multiplier.
pub fn color_wheel(rng: &mut impl Rng, call: WheelColor, bet: i64) -> ColorWheelOutcome {
    let roll = rng.gen_range(0..100u32);
    let mut cursor = 0;
    let mut landed = WheelColor::Purple;
    for color in WheelColor::ALL {
        cursor += color.weight();
        if roll < cursor {
            landed = color;
            break;
        }
    }
    let payout = if landed == call {
        bet * landed.multiplier()
    } else {
        0
    };
    ColorWheelOutcome { landed, payout }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn coinflip_pays_double_or_nothing() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut saw_win = false;
        let mut saw_loss = false;
        for _ in 0..64 {
            let outcome = coinflip(&mut rng, CoinSide::Heads, 100);
            if outcome.landed == CoinSide::Heads {
                assert_eq!(outcome.payout, 200);
                saw_win = true;
            } else {
                assert_eq!(outcome.payout, 0);
                saw_loss = true;
            }
        }
        assert!(saw_win && saw_loss);
    }

    #[test]
    fn coin_side_parsing() {
        assert_eq!(CoinSide::parse("HEADS"), Some(CoinSide::Heads));
        assert_eq!(CoinSide::parse(" t "), Some(CoinSide::Tails));
        assert_eq!(CoinSide::parse("edge"), None);
    }

    #[test]
    fn dice_multipliers_follow_the_odds() {
        let table = [
            (2, 36.0),
            (3, 18.0),
            (4, 12.0),
            (5, 9.0),
            (6, 7.2),
            (7, 6.0),
            (8, 7.2),
            (9, 9.0),
            (10, 12.0),
            (11, 18.0),
            (12, 36.0),
        ];
        for (total, expected) in table {
            assert_eq!(dice_multiplier(total), expected);
        }
        assert_eq!(dice_multiplier(13), 0.0);
    }

    #[test]
    fn dice_roll_pays_only_exact_calls() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            let outcome = dice_roll(&mut rng, 7, 10);
            assert!((1..=6).contains(&outcome.die_one));
            assert!((1..=6).contains(&outcome.die_two));
            assert_eq!(outcome.total, outcome.die_one + outcome.die_two);
            if outcome.total == 7 {
                assert_eq!(outcome.payout, 60);
            } else {
                assert_eq!(outcome.payout, 0);
            }
        }
    }

    #[test]
    fn dice_fractional_multiplier_floors() {
        // A call of 8 at bet 25 pays floor(25 * 7.2) = 180 on a hit.
        let mut rng = StdRng::seed_from_u64(1);
        loop {
            let outcome = dice_roll(&mut rng, 8, 25);
            if outcome.total == 8 {
                assert_eq!(outcome.payout, 180);
                break;
            }
        }
    }

    #[test]
    fn lucky_multiplier_tiers() {
        assert_eq!(lucky_multiplier(0), 50.0);
        assert_eq!(lucky_multiplier(5), 10.0);
        assert_eq!(lucky_multiplier(6), 5.0);
        assert_eq!(lucky_multiplier(10), 5.0);
        assert_eq!(lucky_multiplier(20), 2.0);
        assert_eq!(lucky_multiplier(21), 0.0);
    }

    #[test]
    fn lucky_number_payout_matches_tier() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..100 {
            let outcome = lucky_number(&mut rng, 50, 10);
            assert!((1..=100).contains(&outcome.drawn));
            assert_eq!(outcome.difference, 50u32.abs_diff(outcome.drawn));
            let expected = (10.0 * lucky_multiplier(outcome.difference)).floor() as i64;
            assert_eq!(outcome.payout, expected);
        }
    }

    #[test]
    fn wheel_weights_cover_the_whole_range() {
        let total: u32 = WheelColor::ALL.iter().map(|c| c.weight()).sum();
        assert_eq!(total, 100);
    }

    #[test]
    fn color_wheel_pays_landed_multiplier() {
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..200 {
            let outcome = color_wheel(&mut rng, WheelColor::Red, 10);
            if outcome.landed == WheelColor::Red {
                assert_eq!(outcome.payout, 20);
            } else {
                assert_eq!(outcome.payout, 0);
            }
        }
    }

    #[test]
    fn color_parsing() {
        assert_eq!(WheelColor::parse("Purple"), Some(WheelColor::Purple));
        assert_eq!(WheelColor::parse("  blue"), Some(WheelColor::Blue));
        assert_eq!(WheelColor::parse("orange"), None);
    }
}
