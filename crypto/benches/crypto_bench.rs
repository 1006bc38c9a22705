use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn ed25519_sign_bench(c: &mut Criterion) {
    let kp = zkvote_crypto::generate_keypair();
    let digest = zkvote_crypto::intent_digest(&[42u8; 256]);

    c.bench_function("ed25519_sign_intent", |b| {
        b.iter(|| zkvote_crypto::sign_message(black_box(&digest), &kp.private))
    });
}

fn address_seed_bench(c: &mut Criterion) {
    c.bench_function("gen_address_seed", |b| {
        b.iter(|| {
            zkvote_crypto::gen_address_seed(
                black_box("129390038577185583942388216820280642146"),
                "sub",
                black_box("1234567890"),
                "my-client-id",
            )
        })
    });
}

fn derive_address_bench(c: &mut Criterion) {
    c.bench_function("derive_address_for_claims", |b| {
        b.iter(|| {
            zkvote_crypto::derive_address_for_claims(
                "https://accounts.google.com",
                "my-client-id",
                black_box("1234567890"),
                "42",
            )
        })
    });
}

fn nonce_bench(c: &mut Criterion) {
    let kp = zkvote_crypto::keypair_from_seed(&[3u8; 32]);
    let randomness = zkvote_crypto::generate_randomness();

    c.bench_function("compute_nonce", |b| {
        b.iter(|| zkvote_crypto::compute_nonce(&kp.public, black_box(12), &randomness))
    });
}

criterion_group!(
    benches,
    ed25519_sign_bench,
    address_seed_bench,
    derive_address_bench,
    nonce_bench,
);
criterion_main!(benches);
