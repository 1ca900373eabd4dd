use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{Postgres, QueryBuilder, Row};
use uuid::Uuid;

use super::{PostgresClient, PostgresError};
use crate::core::{like_pattern, ListingFilter, Pagination, TextMatch};
use crate::models::{
    GeometryType, Listing, ListingDetail, ListingForm, Location, Model3D, OwnerSummary, Photo,
};

const LISTING_COLUMNS: &str = "l.id, l.owner_id, l.name, l.description, l.address, l.city, \
     l.state, l.zip_code, l.latitude, l.longitude, l.university, l.price, l.size, l.bedrooms, \
     l.bathrooms, l.available_from, l.amenities, l.photos, l.model_3d, l.is_available, l.tags, \
     l.rating, l.rating_count, l.views, l.created_at, l.updated_at";

fn listing_from_row(row: &PgRow) -> Result<Listing, sqlx::Error> {
    let latitude: f64 = row.try_get("latitude")?;
    let longitude: f64 = row.try_get("longitude")?;
    let photos: Json<Vec<Photo>> = row.try_get("photos")?;
    let model_3d: Option<Json<Model3D>> = row.try_get("model_3d")?;

    Ok(Listing {
        id: row.try_get("id")?,
        owner_id: row.try_get("owner_id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        location: Location {
            kind: GeometryType::Point,
            coordinates: [longitude, latitude],
            address: row.try_get("address")?,
            city: row.try_get("city")?,
            state: row.try_get("state")?,
            zip_code: row.try_get("zip_code")?,
        },
        university: row.try_get("university")?,
        price: row.try_get("price")?,
        size: row.try_get("size")?,
        bedrooms: row.try_get("bedrooms")?,
        bathrooms: row.try_get("bathrooms")?,
        available_from: row.try_get("available_from")?,
        amenities: row.try_get("amenities")?,
        photos: photos.0,
        model_3d: model_3d.map(|m| m.0),
        is_available: row.try_get("is_available")?,
        tags: row.try_get("tags")?,
        rating: row.try_get("rating")?,
        rating_count: row.try_get("rating_count")?,
        views: row.try_get("views")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Append the WHERE clause for `filter` to a query over `listings l`
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &ListingFilter) {
    builder.push(" WHERE TRUE");

    if let Some(min) = filter.min_price {
        builder.push(" AND l.price >= ").push_bind(min);
    }
    if let Some(max) = filter.max_price {
        builder.push(" AND l.price <= ").push_bind(max);
    }

    match &filter.university {
        Some(TextMatch::Exact(university)) => {
            builder.push(" AND l.university = ").push_bind(university.clone());
        }
        Some(TextMatch::Contains(university)) => {
            builder.push(" AND l.university ILIKE ").push_bind(like_pattern(university));
        }
        None => {}
    }

    if let Some(min) = filter.min_bedrooms {
        builder.push(" AND l.bedrooms >= ").push_bind(min);
    }
    if let Some(min) = filter.min_bathrooms {
        builder.push(" AND l.bathrooms >= ").push_bind(min);
    }
    if let Some(available) = filter.is_available {
        builder.push(" AND l.is_available = ").push_bind(available);
    }

    if !filter.amenities_all.is_empty() {
        builder.push(" AND l.amenities @> ").push_bind(filter.amenities_all.clone());
    }
    if !filter.tags_any.is_empty() {
        builder.push(" AND l.tags && ").push_bind(filter.tags_any.clone());
    }

    if let Some(near) = &filter.near {
        let bbox = near.bounding_box();
        let lat = near.center.y();
        let lng = near.center.x();

        // Cheap box test first, then the exact spherical-cap test
        builder
            .push(" AND l.latitude BETWEEN ")
            .push_bind(bbox.min_lat)
            .push(" AND ")
            .push_bind(bbox.max_lat)
            .push(" AND (");
        for (i, (min_lon, max_lon)) in bbox.longitude_ranges().into_iter().enumerate() {
            if i > 0 {
                builder.push(" OR ");
            }
            builder
                .push("l.longitude BETWEEN ")
                .push_bind(min_lon)
                .push(" AND ")
                .push_bind(max_lon);
        }
        builder
            .push(")")
            .push(" AND 2 * asin(LEAST(1.0, sqrt(power(sin(radians(l.latitude - ")
            .push_bind(lat)
            .push(") / 2), 2) + cos(radians(")
            .push_bind(lat)
            .push(")) * cos(radians(l.latitude)) * power(sin(radians(l.longitude - ")
            .push_bind(lng)
            .push(") / 2), 2)))) <= ")
            .push_bind(near.radius_radians());
    }

    if let Some(address) = &filter.address_contains {
        builder.push(" AND l.address ILIKE ").push_bind(like_pattern(address));
    }
}

impl PostgresClient {
    /// One page of listings matching `filter`, newest first, plus the total
    /// number of matches
    pub async fn list_listings(
        &self,
        filter: &ListingFilter,
        pagination: Pagination,
    ) -> Result<(Vec<Listing>, u64), PostgresError> {
        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {LISTING_COLUMNS} FROM listings l"));
        push_filter(&mut select, filter);
        select
            .push(" ORDER BY l.created_at DESC, l.id LIMIT ")
            .push_bind(pagination.limit as i64)
            .push(" OFFSET ")
            .push_bind(pagination.skip() as i64);

        let rows = select.build().fetch_all(&self.pool).await?;
        let listings = rows
            .iter()
            .map(listing_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM listings l");
        push_filter(&mut count, filter);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        tracing::debug!(
            "Listing page {} ({} of {} matches)",
            pagination.page,
            listings.len(),
            total
        );

        Ok((listings, total.max(0) as u64))
    }

    /// Listings matching `filter`, newest first, at most `limit` if given
    pub async fn find_listings(
        &self,
        filter: &ListingFilter,
        limit: Option<u32>,
    ) -> Result<Vec<Listing>, PostgresError> {
        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {LISTING_COLUMNS} FROM listings l"));
        push_filter(&mut select, filter);
        select.push(" ORDER BY l.created_at DESC, l.id");
        if let Some(limit) = limit {
            select.push(" LIMIT ").push_bind(limit as i64);
        }

        let rows = select.build().fetch_all(&self.pool).await?;

        Ok(rows
            .iter()
            .map(listing_from_row)
            .collect::<Result<Vec<_>, _>>()?)
    }

    pub async fn find_listing(&self, id: Uuid) -> Result<Option<Listing>, PostgresError> {
        let query = format!("SELECT {LISTING_COLUMNS} FROM listings l WHERE l.id = $1");

        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;

        Ok(row.as_ref().map(listing_from_row).transpose()?)
    }

    /// Fetch a listing for display, counting the view in the same statement
    pub async fn view_listing(&self, id: Uuid) -> Result<Option<ListingDetail>, PostgresError> {
        let query = format!(
            r#"
            WITH l AS (
                UPDATE listings SET views = views + 1 WHERE id = $1 RETURNING *
            )
            SELECT {LISTING_COLUMNS},
                   u.id AS owner_ref, u.name AS owner_name, u.email AS owner_email
            FROM l
            LEFT JOIN users u ON u.id = l.owner_id
            "#
        );

        let Some(row) = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await? else {
            return Ok(None);
        };

        let owner_ref: Option<Uuid> = row.try_get("owner_ref")?;
        let owner = match owner_ref {
            Some(id) => Some(OwnerSummary {
                id,
                name: row.try_get("owner_name")?,
                email: row.try_get("owner_email")?,
            }),
            None => None,
        };

        Ok(Some(ListingDetail {
            listing: listing_from_row(&row)?,
            owner,
        }))
    }

    pub async fn create_listing(
        &self,
        owner_id: Uuid,
        form: &ListingForm,
    ) -> Result<Listing, PostgresError> {
        let query = format!(
            r#"
            WITH l AS (
                INSERT INTO listings (
                    id, owner_id, name, description, address, city, state, zip_code,
                    latitude, longitude, university, price, size, bedrooms, bathrooms,
                    available_from, amenities, photos, model_3d, is_available, tags, rating
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
                        $16, $17, $18, $19, $20, $21, $22)
                RETURNING *
            )
            SELECT {LISTING_COLUMNS} FROM l
            "#
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(&form.name)
            .bind(&form.description)
            .bind(&form.location.address)
            .bind(&form.location.city)
            .bind(&form.location.state)
            .bind(&form.location.zip_code)
            .bind(form.location.latitude())
            .bind(form.location.longitude())
            .bind(&form.university)
            .bind(form.price)
            .bind(form.size)
            .bind(form.bedrooms)
            .bind(form.bathrooms)
            .bind(form.available_from)
            .bind(&form.amenities)
            .bind(Json(&form.photos))
            .bind(form.model_3d.as_ref().map(Json))
            .bind(form.is_available)
            .bind(&form.tags)
            .bind(form.rating)
            .fetch_one(&self.pool)
            .await?;

        let listing = listing_from_row(&row)?;
        tracing::debug!("Created listing {} for owner {}", listing.id, owner_id);

        Ok(listing)
    }

    /// Persist every editable field of `listing`
    pub async fn save_listing(&self, listing: &Listing) -> Result<Option<Listing>, PostgresError> {
        let query = format!(
            r#"
            WITH l AS (
                UPDATE listings SET
                    name = $2, description = $3, address = $4, city = $5, state = $6,
                    zip_code = $7, latitude = $8, longitude = $9, university = $10,
                    price = $11, size = $12, bedrooms = $13, bathrooms = $14,
                    available_from = $15, amenities = $16, photos = $17, model_3d = $18,
                    is_available = $19, tags = $20, rating = $21, updated_at = NOW()
                WHERE id = $1
                RETURNING *
            )
            SELECT {LISTING_COLUMNS} FROM l
            "#
        );

        let row = sqlx::query(&query)
            .bind(listing.id)
            .bind(&listing.name)
            .bind(&listing.description)
            .bind(&listing.location.address)
            .bind(&listing.location.city)
            .bind(&listing.location.state)
            .bind(&listing.location.zip_code)
            .bind(listing.location.latitude())
            .bind(listing.location.longitude())
            .bind(&listing.university)
            .bind(listing.price)
            .bind(listing.size)
            .bind(listing.bedrooms)
            .bind(listing.bathrooms)
            .bind(listing.available_from)
            .bind(&listing.amenities)
            .bind(Json(&listing.photos))
            .bind(listing.model_3d.as_ref().map(Json))
            .bind(listing.is_available)
            .bind(&listing.tags)
            .bind(listing.rating)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(listing_from_row).transpose()?)
    }

    pub async fn delete_listing(&self, id: Uuid) -> Result<bool, PostgresError> {
        let result = sqlx::query("DELETE FROM listings WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
