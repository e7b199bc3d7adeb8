//! Derived values computed from related records on every read.

use std::collections::HashMap;

use uuid::Uuid;

use crate::model::{Movie, Review};

/// Arithmetic mean of `stars` over `reviews`; `0.0` when there are none.
pub fn average_rating(reviews: &[Review]) -> f64 {
  if reviews.is_empty() {
    return 0.0;
  }
  let total: u64 = reviews.iter().map(|r| u64::from(r.stars)).sum();
  total as f64 / reviews.len() as f64
}

/// Number of movies in `movies` owned by `director_id`.
pub fn movie_count(director_id: Uuid, movies: &[Movie]) -> usize {
  movies.iter().filter(|m| m.director_id == director_id).count()
}

/// Movie counts for every director that owns at least one of `movies`.
pub fn movie_counts(movies: &[Movie]) -> HashMap<Uuid, usize> {
  let mut counts = HashMap::new();
  for movie in movies {
    *counts.entry(movie.director_id).or_insert(0) += 1;
  }
  counts
}

/// Group `reviews` by the movie they belong to.
pub fn reviews_by_movie(reviews: Vec<Review>) -> HashMap<Uuid, Vec<Review>> {
  let mut grouped: HashMap<Uuid, Vec<Review>> = HashMap::new();
  for review in reviews {
    grouped.entry(review.movie_id).or_default().push(review);
  }
  grouped
}

#[cfg(test)]
mod tests {
  use super::*;

  fn review(movie_id: Uuid, stars: u8) -> Review {
    Review {
      review_id: Uuid::new_v4(),
      movie_id,
      text: "fine".into(),
      stars,
    }
  }

  fn movie(director_id: Uuid, title: &str) -> Movie {
    Movie {
      movie_id: Uuid::new_v4(),
      title: title.into(),
      description: "x".into(),
      duration: 90,
      director_id,
    }
  }

  #[test]
  fn average_of_no_reviews_is_zero() {
    assert_eq!(average_rating(&[]), 0.0);
  }

  #[test]
  fn average_of_three_four_five_is_four() {
    let m = Uuid::new_v4();
    let reviews = [review(m, 3), review(m, 4), review(m, 5)];
    assert_eq!(average_rating(&reviews), 4.0);
  }

  #[test]
  fn average_keeps_fractions() {
    let m = Uuid::new_v4();
    let reviews = [review(m, 0), review(m, 5)];
    assert_eq!(average_rating(&reviews), 2.5);
  }

  #[test]
  fn movie_count_only_counts_owned_movies() {
    let nolan = Uuid::new_v4();
    let lynch = Uuid::new_v4();
    let movies = [
      movie(nolan, "Memento"),
      movie(lynch, "Eraserhead"),
      movie(nolan, "Insomnia"),
    ];
    assert_eq!(movie_count(nolan, &movies), 2);
    assert_eq!(movie_count(lynch, &movies), 1);
    assert_eq!(movie_count(Uuid::new_v4(), &movies), 0);

    let counts = movie_counts(&movies);
    assert_eq!(counts.get(&nolan), Some(&2));
    assert_eq!(counts.get(&lynch), Some(&1));
  }

  #[test]
  fn reviews_are_grouped_per_movie() {
    let a = Uuid::new_v4();
    let b = Uuid::new_v4();
    let grouped = reviews_by_movie(vec![review(a, 1), review(b, 2), review(a, 3)]);
    assert_eq!(grouped[&a].len(), 2);
    assert_eq!(grouped[&b].len(), 1);
  }
}
