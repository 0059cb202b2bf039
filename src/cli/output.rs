//! Console output helpers for CLI commands

use crate::{
    environment::LakeMap,
    policy::Policy,
    ports::EpisodeSummary,
    types::{Action, ActionId},
};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Format a rate as a percentage
pub fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Lay the policy out on the lake: terminal tiles keep their letter, every
/// other cell shows its action arrow.
pub fn policy_grid(map: &LakeMap, policy: &Policy) -> Vec<String> {
    (0..map.rows())
        .map(|row| {
            (0..map.cols())
                .map(|col| {
                    let state = map.state_at(row, col);
                    match map.tile(state) {
                        Ok(tile) if tile.is_terminal() => tile.as_char(),
                        _ => policy.action(state).map(arrow).unwrap_or('?'),
                    }
                })
                .collect()
        })
        .collect()
}

fn arrow(action: ActionId) -> char {
    Action::from_index(action).map(Action::arrow).unwrap_or('?')
}

/// Print one line per episode with its final-step reward.
pub fn print_episode_rewards(episodes: &[EpisodeSummary]) {
    for summary in episodes {
        println!(
            "  episode {:>4}: reward {} after {} steps",
            summary.episode, summary.final_reward, summary.steps
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_grid_keeps_terminal_letters() {
        let map = LakeMap::parse(&["SF", "HG"]).unwrap();
        let right = Action::Right.index();
        let down = Action::Down.index();
        let policy = Policy::new(vec![right, down, 0, 0], 4).unwrap();

        assert_eq!(policy_grid(&map, &policy), vec!["→↓", "HG"]);
    }

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(0.5), "50.0%");
    }
}
