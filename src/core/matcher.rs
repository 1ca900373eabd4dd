use thiserror::Error;
use uuid::Uuid;

use crate::core::scoring::score_with_shared_interests;
use crate::models::{MatchCandidate, RoommateMatch, RoommatePreference};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// The requesting user has no preference record
    #[error("preferences not set")]
    PreferencesNotSet,
}

/// Rank every candidate against the requesting user's preferences
///
/// The requesting user is skipped if present in `candidates`. Results are
/// sorted by score, highest first; the sort is stable so equal scores keep
/// the order in which the store listed the candidates.
pub fn find_matches(
    subject_id: Uuid,
    subject: Option<&RoommatePreference>,
    candidates: Vec<MatchCandidate>,
) -> Result<Vec<RoommateMatch>, MatchError> {
    let subject = subject.ok_or(MatchError::PreferencesNotSet)?;

    let mut matches: Vec<RoommateMatch> = candidates
        .into_iter()
        .filter(|candidate| candidate.user.id != subject_id)
        .map(|candidate| {
            let (score, shared_interests) =
                score_with_shared_interests(subject, &candidate.preferences);

            RoommateMatch {
                user: candidate.user,
                compatibility_score: score,
                shared_interests,
                preferences: candidate.preferences,
            }
        })
        .collect();

    matches.sort_by(|a, b| b.compatibility_score.cmp(&a.compatibility_score));

    Ok(matches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cleanliness, SleepSchedule, StudyHabits, UserSummary, Visitors};

    fn create_preferences(is_smoker: bool, visitors: Visitors) -> RoommatePreference {
        RoommatePreference {
            sleep_schedule: SleepSchedule::Late,
            cleanliness: Cleanliness::Clean,
            study_habits: StudyHabits::Music,
            is_smoker,
            has_pets: false,
            visitors,
            bio: None,
            interests: vec![],
            gender_preference: None,
        }
    }

    fn create_candidate(name: &str, preferences: RoommatePreference) -> MatchCandidate {
        MatchCandidate {
            user: UserSummary {
                id: Uuid::new_v4(),
                name: name.to_string(),
                email: format!("{}@campus.edu", name.to_lowercase()),
                profile_picture: None,
            },
            preferences,
        }
    }

    #[test]
    fn test_requires_preferences() {
        let result = find_matches(Uuid::new_v4(), None, vec![]);
        assert_eq!(result.unwrap_err(), MatchError::PreferencesNotSet);
    }

    #[test]
    fn test_sorted_by_score_descending() {
        let subject = create_preferences(false, Visitors::Often);
        let candidates = vec![
            create_candidate("Smoker", create_preferences(true, Visitors::Often)),
            create_candidate("Twin", create_preferences(false, Visitors::Often)),
            create_candidate("Homebody", create_preferences(false, Visitors::Rarely)),
        ];

        let matches = find_matches(Uuid::new_v4(), Some(&subject), candidates).unwrap();

        let names: Vec<&str> = matches.iter().map(|m| m.user.name.as_str()).collect();
        assert_eq!(names, vec!["Twin", "Homebody", "Smoker"]);
        assert_eq!(matches[0].compatibility_score, 13);
        assert_eq!(matches[1].compatibility_score, 11);
        assert_eq!(matches[2].compatibility_score, 7);
    }

    #[test]
    fn test_ties_keep_listing_order() {
        let subject = create_preferences(false, Visitors::Often);
        let candidates: Vec<MatchCandidate> = ["A", "B", "C", "D"]
            .iter()
            .map(|name| create_candidate(name, create_preferences(false, Visitors::Often)))
            .collect();

        let matches = find_matches(Uuid::new_v4(), Some(&subject), candidates).unwrap();

        let names: Vec<&str> = matches.iter().map(|m| m.user.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
    }

    #[test]
    fn test_excludes_requesting_user() {
        let subject = create_preferences(false, Visitors::Often);
        let me = create_candidate("Me", subject.clone());
        let my_id = me.user.id;
        let other = create_candidate("Other", create_preferences(false, Visitors::Often));

        let matches = find_matches(my_id, Some(&subject), vec![me, other]).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].user.name, "Other");
    }
}
