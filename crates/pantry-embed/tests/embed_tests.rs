use pantry_core::config::EmbeddingSettings;
use pantry_embed::{dot, get_default_embedder, HashEmbedder};
use proptest::prelude::*;

#[test]
fn default_embedder_shapes_and_determinism() {
    let embedder = get_default_embedder(&EmbeddingSettings::default()).expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 256, "embedding dim is 256");
    assert_eq!(embedder.dim(), 256);

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    assert_eq!(v1, v2);
}

#[test]
fn shared_words_score_higher() {
    let e = HashEmbedder::new(256).unwrap();
    let query = e.embed_text("granola");
    let granola = e.embed_text("Nut-Free Crunch Granola | Sunny Fields | breakfast granola | oats, honey");
    let chips = e.embed_text("Sea Salt Potato Chips | Crisp Co | snacks chips | potatoes, sea salt");
    assert!(dot(&query, &granola) > dot(&query, &chips));
}

#[test]
fn zero_dimension_is_rejected() {
    assert!(matches!(HashEmbedder::new(0), Err(pantry_core::Error::InvalidArgument(_))));
}

#[test]
fn empty_text_embeds_to_zero_vector() {
    let e = HashEmbedder::new(8).unwrap();
    assert!(e.embed_text("the and of").iter().all(|x| *x == 0.0));
}

proptest! {
    #[test]
    fn non_empty_text_is_unit_length(text in "[a-z]{1,10}( [a-z]{1,10}){0,5}", dim in 1usize..64) {
        let e = HashEmbedder::new(dim).unwrap();
        let v = e.embed_text(&text);
        prop_assert_eq!(v.len(), dim);
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        // features may cancel out exactly in tiny dimensions
        prop_assert!(norm == 0.0 || (norm - 1.0).abs() < 1e-3);
    }
}
