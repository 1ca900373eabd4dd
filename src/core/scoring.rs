use std::collections::HashSet;

use crate::models::{
    Cleanliness, GenderPreference, RoommatePreference, SleepSchedule, StudyHabits, Visitors,
};

/// Most points awarded for shared interests
pub const MAX_INTEREST_BONUS: usize = 3;

/// Compatibility score between two preference records
///
/// Fixed-weight additive heuristic, higher is more compatible:
///
/// | field            | equal | close                         | otherwise |
/// |------------------|-------|-------------------------------|-----------|
/// | sleepSchedule    | +2    | +1 if either side is `varies` | 0         |
/// | cleanliness      | +2    | +1 for {clean, very_clean}    | 0         |
/// | studyHabits      | +2    |                               | 0         |
/// | isSmoker         | +3    |                               | -3        |
/// | hasPets          | +2    |                               | 0         |
/// | visitors         | +2    | +1 for {sometimes, rarely}    | 0         |
/// | genderPreference | 0     |                               | -5        |
///
/// Gender is skipped when either side is unset or `no_preference`. Shared
/// interests (exact, case-sensitive, as sets) add up to
/// [`MAX_INTEREST_BONUS`]. The total is not clamped and may be negative.
pub fn compatibility_score(subject: &RoommatePreference, candidate: &RoommatePreference) -> i32 {
    score_with_shared_interests(subject, candidate).0
}

/// Same as [`compatibility_score`], also returning the shared interests in
/// the candidate's order
pub fn score_with_shared_interests(
    subject: &RoommatePreference,
    candidate: &RoommatePreference,
) -> (i32, Vec<String>) {
    let shared = shared_interests(&subject.interests, &candidate.interests);

    let score = sleep_schedule_points(subject.sleep_schedule, candidate.sleep_schedule)
        + cleanliness_points(subject.cleanliness, candidate.cleanliness)
        + study_habits_points(subject.study_habits, candidate.study_habits)
        + smoker_points(subject.is_smoker, candidate.is_smoker)
        + pets_points(subject.has_pets, candidate.has_pets)
        + visitors_points(subject.visitors, candidate.visitors)
        + gender_points(subject.gender_preference, candidate.gender_preference)
        + shared.len().min(MAX_INTEREST_BONUS) as i32;

    (score, shared)
}

#[inline]
fn sleep_schedule_points(a: SleepSchedule, b: SleepSchedule) -> i32 {
    if a == b {
        2
    } else if a == SleepSchedule::Varies || b == SleepSchedule::Varies {
        1
    } else {
        0
    }
}

#[inline]
fn cleanliness_points(a: Cleanliness, b: Cleanliness) -> i32 {
    match (a, b) {
        _ if a == b => 2,
        (Cleanliness::Clean, Cleanliness::VeryClean) | (Cleanliness::VeryClean, Cleanliness::Clean) => 1,
        _ => 0,
    }
}

#[inline]
fn study_habits_points(a: StudyHabits, b: StudyHabits) -> i32 {
    if a == b {
        2
    } else {
        0
    }
}

#[inline]
fn smoker_points(a: bool, b: bool) -> i32 {
    if a == b {
        3
    } else {
        -3
    }
}

#[inline]
fn pets_points(a: bool, b: bool) -> i32 {
    if a == b {
        2
    } else {
        0
    }
}

#[inline]
fn visitors_points(a: Visitors, b: Visitors) -> i32 {
    match (a, b) {
        _ if a == b => 2,
        (Visitors::Sometimes, Visitors::Rarely) | (Visitors::Rarely, Visitors::Sometimes) => 1,
        _ => 0,
    }
}

#[inline]
fn gender_points(a: Option<GenderPreference>, b: Option<GenderPreference>) -> i32 {
    match (a, b) {
        (Some(a), Some(b))
            if a != GenderPreference::NoPreference
                && b != GenderPreference::NoPreference
                && a != b =>
        {
            -5
        }
        _ => 0,
    }
}

/// Set intersection, ordered as in `candidate`, without duplicates
fn shared_interests(subject: &[String], candidate: &[String]) -> Vec<String> {
    let ours: HashSet<&str> = subject.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();

    candidate
        .iter()
        .filter(|interest| ours.contains(interest.as_str()) && seen.insert(interest.as_str()))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_preferences() -> RoommatePreference {
        RoommatePreference {
            sleep_schedule: SleepSchedule::Early,
            cleanliness: Cleanliness::Clean,
            study_habits: StudyHabits::Quiet,
            is_smoker: false,
            has_pets: true,
            visitors: Visitors::Often,
            bio: None,
            interests: vec![],
            gender_preference: None,
        }
    }

    fn interests(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_identical_records_baseline() {
        let prefs = create_test_preferences();
        assert_eq!(compatibility_score(&prefs, &prefs), 13);
    }

    #[test]
    fn test_sleep_schedule_points() {
        assert_eq!(sleep_schedule_points(SleepSchedule::Late, SleepSchedule::Late), 2);
        assert_eq!(sleep_schedule_points(SleepSchedule::Late, SleepSchedule::Varies), 1);
        assert_eq!(sleep_schedule_points(SleepSchedule::Varies, SleepSchedule::Early), 1);
        assert_eq!(sleep_schedule_points(SleepSchedule::Early, SleepSchedule::Late), 0);
    }

    #[test]
    fn test_cleanliness_points() {
        assert_eq!(cleanliness_points(Cleanliness::Clean, Cleanliness::VeryClean), 1);
        assert_eq!(cleanliness_points(Cleanliness::VeryClean, Cleanliness::Clean), 1);
        assert_eq!(cleanliness_points(Cleanliness::Clean, Cleanliness::Messy), 0);
        assert_eq!(cleanliness_points(Cleanliness::Messy, Cleanliness::VeryClean), 0);
    }

    #[test]
    fn test_visitors_points() {
        assert_eq!(visitors_points(Visitors::Sometimes, Visitors::Rarely), 1);
        assert_eq!(visitors_points(Visitors::Rarely, Visitors::Sometimes), 1);
        assert_eq!(visitors_points(Visitors::Often, Visitors::Sometimes), 0);
        assert_eq!(visitors_points(Visitors::Often, Visitors::Often), 2);
    }

    #[test]
    fn test_smoker_mismatch_is_penalty() {
        let subject = create_test_preferences();
        let mut candidate = create_test_preferences();
        candidate.is_smoker = true;

        assert_eq!(compatibility_score(&subject, &candidate), 13 - 6);
    }

    #[test]
    fn test_gender_mismatch_penalty_only() {
        let mut subject = create_test_preferences();
        let mut candidate = create_test_preferences();

        subject.gender_preference = Some(GenderPreference::Female);
        candidate.gender_preference = Some(GenderPreference::Female);
        assert_eq!(compatibility_score(&subject, &candidate), 13, "no bonus for a match");

        candidate.gender_preference = Some(GenderPreference::Male);
        assert_eq!(compatibility_score(&subject, &candidate), 8);

        candidate.gender_preference = Some(GenderPreference::NoPreference);
        assert_eq!(compatibility_score(&subject, &candidate), 13);
    }

    #[test]
    fn test_interest_bonus_capped() {
        let mut subject = create_test_preferences();
        let mut candidate = create_test_preferences();
        subject.interests = interests(&["a", "b", "c", "d", "e"]);
        candidate.interests = interests(&["e", "d", "c", "b", "a"]);

        let (score, shared) = score_with_shared_interests(&subject, &candidate);
        assert_eq!(score, 16);
        assert_eq!(shared, interests(&["e", "d", "c", "b", "a"]));
    }

    #[test]
    fn test_interests_are_sets_and_case_sensitive() {
        let mut subject = create_test_preferences();
        let mut candidate = create_test_preferences();
        subject.interests = interests(&["Hiking", "music", "music"]);
        candidate.interests = interests(&["hiking", "music", "music"]);

        let (score, shared) = score_with_shared_interests(&subject, &candidate);
        assert_eq!(shared, interests(&["music"]));
        assert_eq!(score, 14);
    }
}
