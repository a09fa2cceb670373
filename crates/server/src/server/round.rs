//! Round-end ranking and the summary announcement.

use super::session::Session;
use protocol::Color;

const RULE: &str = "____________________________";
const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];

/// One line of the final ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub color: Color,
    pub score: u32,
}

/// Rank sessions by descending score. Equal scores keep their input order.
pub fn rank<'a>(sessions: impl IntoIterator<Item = &'a Session>) -> Vec<Placement> {
    let mut ranking: Vec<Placement> = sessions
        .into_iter()
        .map(|s| Placement {
            color: s.color,
            score: s.score,
        })
        .collect();
    ranking.sort_by(|a, b| b.score.cmp(&a.score));
    ranking
}

/// Build the round-end chat announcement naming the first `podium_size`
/// places.
pub fn summary_message(ranking: &[Placement], podium_size: usize) -> String {
    let mut msg = format!("{RULE}\n🏆 Round over! 🏆\n");
    if ranking.is_empty() {
        msg.push_str("No players took part this round!\n");
    }
    for (place, p) in ranking.iter().take(podium_size).enumerate() {
        let line = match MEDALS.get(place) {
            Some(medal) => format!("{medal} {} : {}%\n", p.color, p.score),
            None => format!("{}. {} : {}%\n", place + 1, p.color, p.score),
        };
        msg.push_str(&line);
    }
    msg.push_str(RULE);
    msg
}

#[cfg(test)]
mod tests {
    use super::*;
    use protocol::Direction;

    fn session(id: &str, color: Color, score: u32) -> Session {
        let mut s = Session::new(id.into(), "127.0.0.1:1".parse().unwrap(), color);
        s.score = score;
        s.direction = Direction::default();
        s
    }

    const A: Color = Color::new(0xaa, 0, 0);
    const B: Color = Color::new(0, 0xbb, 0);
    const C: Color = Color::new(0, 0, 0xcc);
    const D: Color = Color::new(0xdd, 0xdd, 0);

    #[test]
    fn test_ties_keep_registry_order() {
        let sessions = [session("a", A, 80), session("b", B, 80), session("c", C, 50)];
        let ranking = rank(&sessions);
        assert_eq!(ranking.iter().map(|p| p.color).collect::<Vec<_>>(), [A, B, C]);

        let msg = summary_message(&ranking, 3);
        let first = msg.find("🥇 #aa0000 : 80%").unwrap();
        let second = msg.find("🥈 #00bb00 : 80%").unwrap();
        let third = msg.find("🥉 #0000cc : 50%").unwrap();
        assert!(first < second && second < third);
    }

    #[test]
    fn test_no_participants() {
        let msg = summary_message(&rank(Vec::<&Session>::new()), 3);
        assert!(msg.contains("No players took part"));
        assert!(!msg.contains('%'));
    }

    #[test]
    fn test_only_podium_is_named() {
        let sessions = [
            session("a", A, 10),
            session("b", B, 20),
            session("c", C, 30),
            session("d", D, 40),
        ];
        let msg = summary_message(&rank(&sessions), 3);
        assert!(msg.contains("🥇 #dddd00 : 40%"));
        assert!(!msg.contains("#aa0000"));
    }

    #[test]
    fn test_larger_podium_numbers_extra_places() {
        let sessions = [
            session("a", A, 10),
            session("b", B, 20),
            session("c", C, 30),
            session("d", D, 40),
        ];
        let msg = summary_message(&rank(&sessions), 5);
        assert!(msg.contains("4. #aa0000 : 10%"));
    }

    #[test]
    fn test_single_player() {
        let msg = summary_message(&rank(&[session("a", A, 3)]), 3);
        assert!(msg.contains("🥇 #aa0000 : 3%"));
        assert!(!msg.contains("🥈"));
    }

    #[test]
    fn test_summary_layout() {
        let sessions = [session("a", A, 7), session("b", B, 2)];
        let msg = summary_message(&rank(&sessions), 3);
        let expected = format!("{RULE}\n🏆 Round over! 🏆\n🥇 #aa0000 : 7%\n🥈 #00bb00 : 2%\n{RULE}");
        assert_eq!(msg, expected);
    }
}
