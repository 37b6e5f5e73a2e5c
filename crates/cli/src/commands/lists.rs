//! Local cart and wishlist.
//!
//! Lists live in the local store under the signed-in identity's namespace
//! (or the guest namespace) and never touch the backend, except to copy the
//! product record when it is first added.

use bazaar_core::{ListKind, PersistedList, ProductSnapshot};
use rust_decimal::Decimal;

use bazaar_client::QueryKey;

use super::{CliError, Context, print_table};

async fn snapshot(ctx: &Context, id: &str) -> Result<ProductSnapshot, CliError> {
    let api = ctx.api();
    Ok(ctx
        .cache
        .get_or_fetch(QueryKey::from(["product", id, "snapshot"]), || {
            api.product_snapshot(id)
        })
        .await?)
}

/// Add a product to the cart, or bump its quantity.
///
/// # Errors
///
/// Returns an error if the product cannot be loaded or the cart cannot be
/// saved.
pub async fn cart_add(ctx: &Context, id: &str) -> Result<(), CliError> {
    let product = snapshot(ctx, id).await?;
    let key = ctx.session.list_key(ListKind::Cart);
    let list = ctx.lists.add_or_increment(&key, product)?;
    ctx.notices.push("Added to cart");
    print_list(&list, true);
    Ok(())
}

/// Remove a product from the cart.
///
/// # Errors
///
/// Returns an error if the cart cannot be saved.
pub fn cart_remove(ctx: &Context, id: &str) -> Result<(), CliError> {
    let key = ctx.session.list_key(ListKind::Cart);
    let list = ctx.lists.remove(&key, id)?;
    ctx.notices.push("Removed from cart");
    print_list(&list, true);
    Ok(())
}

/// Print the cart with its subtotal.
pub fn cart_show(ctx: &Context) {
    let list = ctx.lists.load(&ctx.session.list_key(ListKind::Cart));
    print_list(&list, true);
}

/// Add a product to the wishlist, or take it out if already there.
///
/// # Errors
///
/// Returns an error if the product cannot be loaded or the wishlist cannot
/// be saved.
pub async fn wishlist_toggle(ctx: &Context, id: &str) -> Result<(), CliError> {
    let key = ctx.session.list_key(ListKind::Wishlist);
    let current = ctx.lists.load(&key);

    // Removing needs no fresh product record.
    let product = match current.get(id) {
        Some(entry) => entry.product.clone(),
        None => snapshot(ctx, id).await?,
    };

    let (list, present) = ctx.lists.toggle(&key, product, None)?;
    ctx.notices.push(if present {
        "Added to wishlist"
    } else {
        "Removed from wishlist"
    });
    print_list(&list, false);
    Ok(())
}

/// Print the wishlist.
pub fn wishlist_show(ctx: &Context) {
    let list = ctx.lists.load(&ctx.session.list_key(ListKind::Wishlist));
    print_list(&list, false);
}

fn list_rows(list: &PersistedList) -> Vec<Vec<String>> {
    list.iter()
        .map(|entry| {
            let product = &entry.product;
            vec![
                product.id().to_string(),
                product.title().unwrap_or("(untitled)").to_string(),
                product
                    .price()
                    .map(|price| format!("{:.2}", price.round_dp(2)))
                    .unwrap_or_default(),
                entry
                    .quantity
                    .map(|quantity| quantity.to_string())
                    .unwrap_or_default(),
            ]
        })
        .collect()
}

fn print_list(list: &PersistedList, with_total: bool) {
    print_table(&["ID", "TITLE", "PRICE", "QTY"], &list_rows(list));
    if with_total && !list.is_empty() {
        let subtotal: Decimal = list.subtotal();
        println!(
            "{} item(s), subtotal {:.2}",
            list.item_count(),
            subtotal.round_dp(2)
        );
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_list_rows() {
        let lamp =
            ProductSnapshot::from_value(json!({"_id": "p1", "title": "Lamp", "price": "12.5"}))
                .unwrap();
        let mug = ProductSnapshot::from_value(json!({"id": 7})).unwrap();
        let list = PersistedList::new()
            .add_or_increment(lamp.clone())
            .add_or_increment(lamp);
        let (list, _) = list.toggle(mug, None);

        assert_eq!(
            list_rows(&list),
            [
                vec!["p1", "Lamp", "12.50", "2"],
                vec!["7", "(untitled)", "", ""],
            ]
        );
    }
}
