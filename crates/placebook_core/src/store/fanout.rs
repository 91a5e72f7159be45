//! Write event to notification recipient planning.
//!
//! # Responsibility
//! - Map one write event onto the notifications it produces, one per
//!   recipient, without touching store state.
//!
//! # Invariants
//! - Planning is pure: identical inputs yield identical drafts.
//! - An actor is never notified about their own action.
//! - Each (recipient, kind) pair appears at most once per event.

use crate::model::announcement::Announcement;
use crate::model::notification::{NotificationDraft, NotificationKind};
use crate::model::place::Place;
use crate::model::question::{Answer, Question};
use crate::model::review::Review;
use crate::model::EntityId;
use std::collections::{BTreeMap, BTreeSet};

/// Favorites relation: user id to the set of liked place ids.
pub type LikedIndex = BTreeMap<EntityId, BTreeSet<EntityId>>;

/// A completed write that may notify other users.
#[derive(Debug, Clone, Copy)]
pub enum WriteEvent<'a> {
    ReviewCreated {
        review: &'a Review,
        place: &'a Place,
        reviewer_name: &'a str,
    },
    QuestionCreated {
        question: &'a Question,
        place: &'a Place,
        asker_name: &'a str,
    },
    AnswerAdded {
        question: &'a Question,
        answer: &'a Answer,
        place: &'a Place,
        answerer_name: &'a str,
    },
    ReviewResponded {
        review: &'a Review,
        place: &'a Place,
        responder_id: &'a str,
    },
    AnnouncementCreated {
        announcement: &'a Announcement,
        place: &'a Place,
    },
    ReviewLiked {
        review: &'a Review,
        place: &'a Place,
        liker_id: &'a str,
        liker_name: &'a str,
    },
}

/// Returns every user id whose liked set contains `place_id`.
pub fn users_liking(liked: &LikedIndex, place_id: &str) -> Vec<EntityId> {
    liked
        .iter()
        .filter(|(_, places)| places.contains(place_id))
        .map(|(user_id, _)| user_id.clone())
        .collect()
}

/// Plans the notifications produced by `event`.
pub fn plan_notifications(event: &WriteEvent<'_>, liked: &LikedIndex) -> Vec<NotificationDraft> {
    let mut drafts = Vec::new();

    match *event {
        WriteEvent::ReviewCreated {
            review,
            place,
            reviewer_name,
        } => {
            let url = review_url(place, review);
            if !place.owner_id.is_empty() && place.owner_id != review.user_id {
                drafts.push(draft(
                    &place.owner_id,
                    NotificationKind::Review,
                    "New review",
                    format!(
                        "{reviewer_name} rated {} {} stars",
                        place.name, review.rating
                    ),
                    place,
                    url.clone(),
                    |d| d.review_id = Some(review.id.clone()),
                ));
            }
            for user_id in users_liking(liked, &place.id) {
                if user_id == review.user_id {
                    continue;
                }
                drafts.push(draft(
                    &user_id,
                    NotificationKind::NewReviewOnLikedPlace,
                    "New review on a place you like",
                    format!("{reviewer_name} reviewed {}", place.name),
                    place,
                    url.clone(),
                    |d| d.review_id = Some(review.id.clone()),
                ));
            }
        }
        WriteEvent::QuestionCreated {
            question,
            place,
            asker_name,
        } => {
            if !place.owner_id.is_empty() && place.owner_id != question.user_id {
                drafts.push(draft(
                    &place.owner_id,
                    NotificationKind::NewQuestionOnOwnedPlace,
                    "New question",
                    format!("{asker_name} asked about {}", place.name),
                    place,
                    format!("/places/{}#question-{}", place.id, question.id),
                    |d| d.question_id = Some(question.id.clone()),
                ));
            }
        }
        WriteEvent::AnswerAdded {
            question,
            answer,
            place,
            answerer_name,
        } => {
            if question.user_id != answer.user_id {
                let message = if answer.is_owner {
                    format!("{} answered your question", place.name)
                } else {
                    format!("{answerer_name} answered your question about {}", place.name)
                };
                drafts.push(draft(
                    &question.user_id,
                    NotificationKind::Answer,
                    "New answer",
                    message,
                    place,
                    format!("/places/{}#question-{}", place.id, question.id),
                    |d| {
                        d.question_id = Some(question.id.clone());
                        d.answer_id = Some(answer.id.clone());
                    },
                ));
            }
        }
        WriteEvent::ReviewResponded {
            review,
            place,
            responder_id,
        } => {
            if responder_id != review.user_id {
                drafts.push(draft(
                    &review.user_id,
                    NotificationKind::Response,
                    "The owner responded",
                    format!("{} responded to your review", place.name),
                    place,
                    review_url(place, review),
                    |d| d.review_id = Some(review.id.clone()),
                ));
            }
        }
        WriteEvent::AnnouncementCreated {
            announcement,
            place,
        } => {
            for user_id in users_liking(liked, &place.id) {
                drafts.push(draft(
                    &user_id,
                    NotificationKind::Announcement,
                    &announcement.title,
                    format!("{} posted: {}", place.name, announcement.title),
                    place,
                    format!("/places/{}#announcement-{}", place.id, announcement.id),
                    |_| {},
                ));
            }
        }
        WriteEvent::ReviewLiked {
            review,
            place,
            liker_id,
            liker_name,
        } => {
            if liker_id != review.user_id {
                drafts.push(draft(
                    &review.user_id,
                    NotificationKind::Like,
                    "Someone liked your review",
                    format!("{liker_name} liked your review of {}", place.name),
                    place,
                    review_url(place, review),
                    |d| d.review_id = Some(review.id.clone()),
                ));
            }
        }
    }

    drafts
}

fn review_url(place: &Place, review: &Review) -> String {
    format!("/places/{}#review-{}", place.id, review.id)
}

fn draft(
    recipient: &str,
    kind: NotificationKind,
    title: &str,
    message: String,
    place: &Place,
    action_url: String,
    link: impl FnOnce(&mut NotificationDraft),
) -> NotificationDraft {
    let mut draft = NotificationDraft {
        user_id: recipient.to_string(),
        kind,
        title: title.to_string(),
        message,
        place_id: Some(place.id.clone()),
        review_id: None,
        question_id: None,
        answer_id: None,
        action_url,
    };
    link(&mut draft);
    draft
}

#[cfg(test)]
mod tests {
    use super::{plan_notifications, users_liking, LikedIndex, WriteEvent};
    use crate::model::announcement::{Announcement, AnnouncementKind};
    use crate::model::notification::NotificationKind;
    use crate::model::place::Place;
    use crate::model::question::{Answer, Question};
    use crate::model::review::Review;
    use chrono::Utc;
    use std::collections::{BTreeMap, BTreeSet};

    fn place(owner_id: &str) -> Place {
        Place {
            id: "p1".to_string(),
            owner_id: owner_id.to_string(),
            is_claimed: !owner_id.is_empty(),
            delegated_users: Vec::new(),
            name: "Harbor Cafe".to_string(),
            category: "cafe".to_string(),
            description: String::new(),
            address: None,
            location: None,
            hours: BTreeMap::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn review(user_id: &str) -> Review {
        Review {
            id: "r1".to_string(),
            place_id: "p1".to_string(),
            user_id: user_id.to_string(),
            rating: 4,
            comment: "solid".to_string(),
            details: None,
            images: Vec::new(),
            likes: Vec::new(),
            reports: 0,
            integrity_score: 50,
            verified: false,
            owner_response: None,
            created_at: Utc::now(),
        }
    }

    fn liked(pairs: &[(&str, &str)]) -> LikedIndex {
        let mut index = LikedIndex::new();
        for (user_id, place_id) in pairs {
            index
                .entry((*user_id).to_string())
                .or_insert_with(BTreeSet::new)
                .insert((*place_id).to_string());
        }
        index
    }

    #[test]
    fn review_notifies_owner_and_likers_except_author() {
        let place = place("owner");
        let review = review("author");
        let index = liked(&[("author", "p1"), ("fan", "p1"), ("other", "p2")]);

        let drafts = plan_notifications(
            &WriteEvent::ReviewCreated {
                review: &review,
                place: &place,
                reviewer_name: "Alex",
            },
            &index,
        );

        let recipients: Vec<(&str, NotificationKind)> = drafts
            .iter()
            .map(|d| (d.user_id.as_str(), d.kind))
            .collect();
        assert_eq!(
            recipients,
            vec![
                ("owner", NotificationKind::Review),
                ("fan", NotificationKind::NewReviewOnLikedPlace),
            ]
        );
        assert!(drafts.iter().all(|d| d.review_id.as_deref() == Some("r1")));
    }

    #[test]
    fn review_on_unclaimed_place_only_reaches_likers() {
        let place = place("");
        let review = review("author");
        let drafts = plan_notifications(
            &WriteEvent::ReviewCreated {
                review: &review,
                place: &place,
                reviewer_name: "Alex",
            },
            &LikedIndex::new(),
        );
        assert!(drafts.is_empty());
    }

    #[test]
    fn owner_reviewing_own_place_is_not_notified() {
        let place = place("owner");
        let review = review("owner");
        let drafts = plan_notifications(
            &WriteEvent::ReviewCreated {
                review: &review,
                place: &place,
                reviewer_name: "Morgan",
            },
            &LikedIndex::new(),
        );
        assert!(drafts.is_empty());
    }

    #[test]
    fn answer_notifies_question_author_only() {
        let place = place("owner");
        let question = Question {
            id: "q1".to_string(),
            place_id: "p1".to_string(),
            user_id: "asker".to_string(),
            question: "Open late?".to_string(),
            answers: Vec::new(),
            created_at: Utc::now(),
        };
        let answer = Answer {
            id: "a1".to_string(),
            user_id: "owner".to_string(),
            text: "Until 11pm".to_string(),
            is_owner: true,
            created_at: Utc::now(),
        };

        let drafts = plan_notifications(
            &WriteEvent::AnswerAdded {
                question: &question,
                answer: &answer,
                place: &place,
                answerer_name: "Morgan",
            },
            &liked(&[("fan", "p1")]),
        );

        assert_eq!(drafts.len(), 1);
        assert_eq!(drafts[0].user_id, "asker");
        assert_eq!(drafts[0].kind, NotificationKind::Answer);
        assert_eq!(drafts[0].answer_id.as_deref(), Some("a1"));
    }

    #[test]
    fn announcement_reaches_every_liker() {
        let place = place("owner");
        let announcement = Announcement {
            id: "n1".to_string(),
            place_id: "p1".to_string(),
            title: "Happy hour".to_string(),
            content: "2 for 1".to_string(),
            kind: AnnouncementKind::Offer,
            is_active: true,
            created_at: Utc::now(),
        };
        let index = liked(&[("a", "p1"), ("b", "p1"), ("c", "p9")]);

        let drafts = plan_notifications(
            &WriteEvent::AnnouncementCreated {
                announcement: &announcement,
                place: &place,
            },
            &index,
        );

        let recipients: Vec<&str> = drafts.iter().map(|d| d.user_id.as_str()).collect();
        assert_eq!(recipients, vec!["a", "b"]);
        assert!(drafts
            .iter()
            .all(|d| d.kind == NotificationKind::Announcement));
    }

    #[test]
    fn liking_own_review_is_silent() {
        let place = place("owner");
        let review = review("author");
        let own = plan_notifications(
            &WriteEvent::ReviewLiked {
                review: &review,
                place: &place,
                liker_id: "author",
                liker_name: "Alex",
            },
            &LikedIndex::new(),
        );
        assert!(own.is_empty());

        let other = plan_notifications(
            &WriteEvent::ReviewLiked {
                review: &review,
                place: &place,
                liker_id: "someone",
                liker_name: "Sam",
            },
            &LikedIndex::new(),
        );
        assert_eq!(other.len(), 1);
        assert_eq!(other[0].kind, NotificationKind::Like);
    }

    #[test]
    fn users_liking_filters_by_place() {
        let index = liked(&[("a", "p1"), ("b", "p2")]);
        assert_eq!(users_liking(&index, "p2"), vec!["b".to_string()]);
    }
}
