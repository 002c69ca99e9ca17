use sqlx::PgPool;
use storyloom_core::fixtures::SAMPLE_COMICS;
use storyloom_db::repositories::{ComicRepo, PanelRepo, StoryRepo};
use storyloom_db::seed::seed_sample_data;

#[sqlx::test(migrations = "../../db/migrations")]
async fn seeding_twice_matches_seeding_once(pool: PgPool) {
    let first = seed_sample_data(&pool, chrono::Utc::now()).await.unwrap();
    assert_eq!(first.comics_created as usize, SAMPLE_COMICS.len());
    assert_eq!(first.stories_created, 1);

    let counts = (
        ComicRepo::count(&pool).await.unwrap(),
        PanelRepo::count(&pool).await.unwrap(),
        StoryRepo::count(&pool).await.unwrap(),
    );

    let second = seed_sample_data(&pool, chrono::Utc::now()).await.unwrap();
    assert!(second.is_noop());

    assert_eq!(
        counts,
        (
            ComicRepo::count(&pool).await.unwrap(),
            PanelRepo::count(&pool).await.unwrap(),
            StoryRepo::count(&pool).await.unwrap(),
        )
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn seeded_panels_are_ordered_from_one(pool: PgPool) {
    seed_sample_data(&pool, chrono::Utc::now()).await.unwrap();

    let comics = ComicRepo::list(&pool, 10, 0).await.unwrap();
    for comic in comics {
        let panels = PanelRepo::list_for_comic(&pool, comic.id).await.unwrap();
        let sequence: Vec<i32> = panels.iter().map(|p| p.sequence_number).collect();
        let expected: Vec<i32> = (1..=panels.len() as i32).collect();
        assert_eq!(sequence, expected);
        let next = PanelRepo::next_sequence_number(&pool, comic.id)
            .await
            .unwrap();
        assert_eq!(next, panels.len() as i32 + 1);
    }
}
