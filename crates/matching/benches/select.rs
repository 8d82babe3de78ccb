use chrono::Utc;
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use giftflow_accounts::Account;
use giftflow_catalog::GiftItem;
use giftflow_core::{AccountId, GiftId, Stars};
use giftflow_matching::select;

fn catalog(n: i64) -> Vec<GiftItem> {
    (0..n)
        .map(|i| GiftItem {
            id: GiftId::new(i),
            price: Stars::new(50 + (i * 37) % 1_000),
            limited: true,
            sold_out: false,
            months: None,
            store_product: None,
            description: None,
        })
        .collect()
}

fn bench_select(c: &mut Criterion) {
    let now = Utc::now();
    let available = catalog(200);

    let mut preferring = Account::fresh(AccountId::new(1), now);
    preferring.apply_credit(Stars::new(2_000), now).unwrap();
    for i in (150..190).rev() {
        preferring.add_preference(GiftId::new(i), now);
    }

    let mut fallback_only = Account::fresh(AccountId::new(2), now);
    fallback_only.apply_credit(Stars::new(2_000), now).unwrap();

    c.bench_function("select/preferred_deep_list", |b| {
        b.iter(|| select(black_box(&preferring), black_box(&available)))
    });

    c.bench_function("select/fallback_scan", |b| {
        b.iter(|| select(black_box(&fallback_only), black_box(&available)))
    });
}

criterion_group!(benches, bench_select);
criterion_main!(benches);
