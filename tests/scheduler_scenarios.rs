use std::collections::HashSet;

use assert_matches::assert_matches;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use spelldrill::{FinalStats, QuizError, QuizScheduler, Settings, WordPool};

fn seeded(settings: Settings, seed: u64) -> QuizScheduler<StdRng> {
    QuizScheduler::with_rng(settings, StdRng::seed_from_u64(seed))
}

fn current(s: &QuizScheduler<StdRng>) -> String {
    s.current_word().expect("a word is being asked").word.clone()
}

// Miss then hit: no first-try credit, both attempts counted, word leaves the queue.
#[test]
fn miss_then_correct_loses_first_try_credit() {
    for seed in 0..10 {
        let mut s = seeded(Settings::default(), seed);
        s.start_session(WordPool::from_words(["cat", "dog"])).unwrap();
        let first = current(&s);
        assert!(first == "cat" || first == "dog");

        assert!(!s.submit_answer("bird").unwrap().correct);
        let outcome = s.submit_answer(&first.to_uppercase()).unwrap();
        assert!(outcome.correct);

        assert_eq!(s.stats().total, 2);
        assert_eq!(s.stats().first_try_correct, 0);
        assert!(s.is_mastered(&first));
        assert!(s.upcoming().all(|e| e.word != first));
        assert_ne!(current(&s), first);
    }
}

#[test]
fn padded_lowercase_answer_finishes_single_word_pool() {
    let mut s = seeded(Settings::default(), 1);
    s.start_session(WordPool::from_words(["Cat"])).unwrap();

    let outcome = s.submit_answer("cat ").unwrap();
    assert!(outcome.correct);
    assert!(outcome.session_finished);
    assert_eq!(outcome.next, None);
    assert_eq!(
        s.final_stats(),
        Some(FinalStats {
            total: 1,
            first_try_correct: 1,
            pool_size: 1
        })
    );
}

#[test]
fn missed_word_returns_within_three_slots() {
    let mut seen = HashSet::new();
    for seed in 0..100 {
        let mut s = seeded(Settings::default(), seed);
        let pool = WordPool::from_words((0..10).map(|i| format!("w{i}")));
        s.start_session(pool).unwrap();
        let word = current(&s);

        s.submit_answer("").unwrap();
        let pos = s
            .upcoming()
            .position(|e| e.word == word)
            .expect("missed word is queued");
        assert!((1..=3).contains(&pos), "seed {seed}: position {pos}");
        seen.insert(pos);
    }
    assert_eq!(seen, HashSet::from([1, 2, 3]));
}

#[test]
fn missed_word_in_small_queue_is_never_asked_next_unless_alone() {
    for seed in 0..30 {
        let mut s = seeded(Settings::default(), seed);
        s.start_session(WordPool::from_words(["a", "b", "c"])).unwrap();
        let word = current(&s);
        s.submit_answer("zzz").unwrap();
        let pos = s.upcoming().position(|e| e.word == word).unwrap();
        assert!(pos == 1 || pos == 2, "seed {seed}: position {pos}");

        let next = s.upcoming().next().unwrap().word.clone();
        s.submit_answer(&word).unwrap();
        // the word was mastered, so its copy is gone and the head is asked
        assert_eq!(current(&s), next);
    }

    let mut s = seeded(Settings::default(), 0);
    s.start_session(WordPool::from_words(["a", "b"])).unwrap();
    let word = current(&s);
    s.submit_answer("zzz").unwrap();
    assert_eq!(s.upcoming().position(|e| e.word == word), Some(1));
}

#[test]
fn repeat_at_end_pushes_to_tail() {
    let settings = Settings {
        repeat_misses_sooner: false,
        ..Settings::default()
    };
    let mut s = seeded(settings, 4);
    s.start_session(WordPool::from_words(["a", "b", "c", "d", "e"]))
        .unwrap();
    let word = current(&s);
    s.submit_answer("nope").unwrap();
    assert_eq!(s.upcoming().last().unwrap().word, word);
    assert_eq!(s.upcoming().count(), 5);
}

#[test]
fn skip_never_counts_and_always_advances() {
    for seed in 0..10 {
        let mut s = seeded(Settings::default(), seed);
        s.start_session(WordPool::from_words(["one", "two", "three"]))
            .unwrap();
        let skipped = current(&s);

        let outcome = s.skip().unwrap();
        assert_eq!(s.stats().total, 0);
        assert!(!outcome.session_finished);
        assert_ne!(outcome.next.as_ref().unwrap().word, skipped);

        // answering it correctly later still earns no first-try credit
        while s.is_active() {
            let w = current(&s);
            s.submit_answer(&w).unwrap();
        }
        let stats = s.final_stats().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.first_try_correct, 2);
    }
}

#[test]
fn empty_pool_leaves_previous_session_alone() {
    let mut s = seeded(Settings::default(), 2);
    assert_matches!(
        s.start_session(WordPool::default()),
        Err(QuizError::EmptyPool)
    );
    assert!(!s.is_active());
    assert_eq!(s.progress().total_count, 0);

    s.start_session(WordPool::from_words(["kept"])).unwrap();
    assert_matches!(
        s.start_session(WordPool::from_words(["   ", "\u{200B}"])),
        Err(QuizError::EmptyPool)
    );
    assert_eq!(current(&s), "kept");
}

#[test]
fn duplicate_words_are_asked_once() {
    let mut s = seeded(Settings::default(), 3);
    let started = s
        .start_session(WordPool::from_words(["Friend", "friend ", "FRIEND", "family"]))
        .unwrap();
    assert_eq!(started.pool_size, 2);
    assert_eq!(s.progress().total_count, 2);
}

// Random learners: mastery only grows, mastered words are never asked again,
// and first-try credit stays within bounds.
#[test]
fn random_sessions_hold_invariants() {
    let words = [
        "because", "friend", "beautiful", "animal", "different", "through", "enough",
    ];
    for seed in 0..40 {
        let mut learner = StdRng::seed_from_u64(1000 + seed);
        let settings = Settings {
            repeat_misses_sooner: seed % 2 == 0,
            ..Settings::default()
        };
        let mut s = seeded(settings, seed);
        s.start_session(WordPool::from_words(words)).unwrap();

        let mut mastered = 0;
        let mut steps = 0;
        while s.is_active() {
            steps += 1;
            assert!(steps < 10_000, "seed {seed}: session never finished");

            let word = current(&s);
            assert!(!s.is_mastered(&word));
            match learner.gen_range(0..10) {
                0..=5 => {
                    s.submit_answer(&word).unwrap();
                }
                6..=8 => {
                    s.submit_answer("wrong").unwrap();
                }
                _ => {
                    s.skip().unwrap();
                }
            }

            let progress = s.progress();
            assert!(progress.mastered_count >= mastered);
            mastered = progress.mastered_count;
            for queued in s.upcoming() {
                assert!(!s.is_mastered(&queued.word));
            }
            let stats = s.stats();
            assert!(stats.first_try_correct <= stats.total);
            assert!(stats.first_try_correct <= words.len());
        }

        let stats = s.final_stats().unwrap();
        assert_eq!(stats.pool_size, words.len());
        assert_eq!(s.progress().mastered_count, words.len());
        assert!(stats.total >= words.len());
    }
}

#[test]
fn precomposed_lowercase_answer_matches_decomposed_word() {
    let mut s = seeded(Settings::default(), 6);
    s.start_session(WordPool::from_words(["\u{3AA}\u{301}"])).unwrap();
    assert!(s.submit_answer("\u{390}").unwrap().correct);
}

#[test]
fn pasted_soft_hyphen_is_ignored() {
    let mut s = seeded(Settings::default(), 6);
    s.start_session(WordPool::from_words(["because"])).unwrap();
    assert!(s.submit_answer("be\u{00AD}cause").unwrap().correct);
}
