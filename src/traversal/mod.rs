//! Boomerang traversal
//!
//! Walks an ordered slice forward until a visitor asks to turn around, then
//! walks back over every item before the turning point. Visits never overlap:
//! each one is awaited before the next begins.

use async_trait::async_trait;

/// What a forward visit asks the traversal to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Keep walking forward
    Continue,
    /// Stop the forward walk and revisit earlier items in reverse
    StopAndReverse,
}

/// Which leg of the traversal a visit belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Summary of a completed traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Traversal {
    /// Index that returned `StopAndReverse`, if any
    pub turned_at: Option<usize>,
    /// Total number of visits (forward and backward)
    pub visits: usize,
}

/// Callback invoked for every visited item.
///
/// The `Step` returned from a backward visit is ignored.
#[async_trait]
pub trait Visitor<T: Sync>: Send {
    type Error: Send;

    async fn visit(
        &mut self,
        item: &T,
        index: usize,
        direction: Direction,
    ) -> Result<Step, Self::Error>;
}

/// Visit `items` forward, turning back at the first `StopAndReverse`.
///
/// A visitor error aborts the traversal and is returned unchanged.
pub async fn boomerang<T, V>(items: &[T], visitor: &mut V) -> Result<Traversal, V::Error>
where
    T: Sync,
    V: Visitor<T>,
{
    let mut traversal = Traversal {
        turned_at: None,
        visits: 0,
    };

    for (index, item) in items.iter().enumerate() {
        traversal.visits += 1;
        if visitor.visit(item, index, Direction::Forward).await? == Step::StopAndReverse {
            traversal.turned_at = Some(index);
            break;
        }
    }

    if let Some(turn) = traversal.turned_at {
        for index in (0..turn).rev() {
            traversal.visits += 1;
            visitor.visit(&items[index], index, Direction::Backward).await?;
        }
    }

    Ok(traversal)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records every visit and turns back at a fixed forward index.
    struct Recorder {
        turn_at: Option<usize>,
        fail_at: Option<(usize, Direction)>,
        calls: Vec<(i32, usize, Direction)>,
    }

    impl Recorder {
        fn new(turn_at: Option<usize>) -> Self {
            Self {
                turn_at,
                fail_at: None,
                calls: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl Visitor<i32> for Recorder {
        type Error = String;

        async fn visit(
            &mut self,
            item: &i32,
            index: usize,
            direction: Direction,
        ) -> Result<Step, String> {
            self.calls.push((*item, index, direction));
            if self.fail_at == Some((index, direction)) {
                return Err(format!("failed at {}", index));
            }
            if direction == Direction::Forward && self.turn_at == Some(index) {
                return Ok(Step::StopAndReverse);
            }
            Ok(Step::Continue)
        }
    }

    #[tokio::test]
    async fn visits_every_item_forward_without_a_turn() {
        let mut recorder = Recorder::new(None);
        let traversal = boomerang(&[1, 2, 3], &mut recorder).await.unwrap();

        assert_eq!(traversal.turned_at, None);
        assert_eq!(traversal.visits, 3);
        assert_eq!(
            recorder.calls,
            vec![
                (1, 0, Direction::Forward),
                (2, 1, Direction::Forward),
                (3, 2, Direction::Forward),
            ]
        );
    }

    #[tokio::test]
    async fn turns_back_at_signalling_index() {
        let mut recorder = Recorder::new(Some(2));
        let traversal = boomerang(&[1, 2, 3, 4, 5], &mut recorder).await.unwrap();

        // 1 2 3 then 2 1
        assert_eq!(traversal.turned_at, Some(2));
        assert_eq!(traversal.visits, 5);
        assert_eq!(
            recorder.calls,
            vec![
                (1, 0, Direction::Forward),
                (2, 1, Direction::Forward),
                (3, 2, Direction::Forward),
                (2, 1, Direction::Backward),
                (1, 0, Direction::Backward),
            ]
        );
    }

    #[tokio::test]
    async fn turn_at_first_index_has_empty_backward_leg() {
        let mut recorder = Recorder::new(Some(0));
        let traversal = boomerang(&[1, 2, 3], &mut recorder).await.unwrap();

        assert_eq!(traversal.turned_at, Some(0));
        assert_eq!(recorder.calls, vec![(1, 0, Direction::Forward)]);
    }

    #[tokio::test]
    async fn empty_slice_visits_nothing() {
        let mut recorder = Recorder::new(Some(0));
        let empty: [i32; 0] = [];
        let traversal = boomerang(&empty, &mut recorder).await.unwrap();

        assert_eq!(traversal.visits, 0);
        assert!(recorder.calls.is_empty());
    }

    #[tokio::test]
    async fn error_aborts_remaining_visits() {
        let mut recorder = Recorder::new(Some(3));
        recorder.fail_at = Some((1, Direction::Backward));

        let err = boomerang(&[1, 2, 3, 4], &mut recorder).await.unwrap_err();

        assert_eq!(err, "failed at 1");
        // index 0 is never revisited
        assert_eq!(recorder.calls.last(), Some(&(2, 1, Direction::Backward)));
        assert_eq!(recorder.calls.len(), 6);
    }
}
