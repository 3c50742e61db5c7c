/// Split `text` into frames that each fit a size-limited delivery channel.
///
/// Lines accumulate greedily into the current frame; a line whose addition
/// (terminator included) would push the frame past `limit` characters closes
/// the frame and starts the next one. The final non-empty frame is always
/// emitted. A single line that alone exceeds the limit passes through as an
/// oversized frame; lines are never broken mid-line.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut frames = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if !current.is_empty() && current.len() + line.len() + 1 > limit {
            frames.push(current);
            current = String::new();
        }
        current.push_str(line);
        current.push('\n');
    }

    if !current.is_empty() {
        frames.push(current);
    }

    frames
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_frames() {
        assert!(split_message("", 2000).is_empty());
    }

    #[test]
    fn single_short_line_yields_one_frame() {
        let frames = split_message("1. Intro", 2000);
        assert_eq!(frames, vec!["1. Intro\n".to_string()]);
    }

    #[test]
    fn frames_stay_under_the_limit() {
        let text = (1..=40)
            .map(|n| format!("{}. Track number {}", n, n))
            .collect::<Vec<_>>()
            .join("\n");
        let frames = split_message(&text, 100);

        assert!(frames.len() > 1);
        for frame in &frames {
            assert!(frame.len() <= 100, "frame of {} chars", frame.len());
        }
    }

    #[test]
    fn concatenated_frames_reproduce_the_input() {
        let text = "alpha\nbeta\ngamma\ndelta";
        let frames = split_message(text, 12);

        let rejoined: String = frames.concat();
        let lines: Vec<&str> = rejoined.lines().collect();
        assert_eq!(lines, vec!["alpha", "beta", "gamma", "delta"]);
    }

    #[test]
    fn oversized_line_passes_through_unsplit() {
        let long_line = "x".repeat(50);
        let text = format!("short\n{}\ntail", long_line);
        let frames = split_message(&text, 20);

        assert!(frames.iter().any(|f| f.trim_end() == long_line));
    }

    #[test]
    fn line_breaks_never_happen_mid_line() {
        let text = "one\ntwo\nthree";
        for frame in split_message(text, 8) {
            for line in frame.lines() {
                assert!(["one", "two", "three"].contains(&line));
            }
        }
    }
}
