use actix_web::{get, post, web, HttpRequest, HttpResponse};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::config::AppConfig;
use crate::dto::user_summary::UserSummary;
use crate::entity::users::{
    ActiveModel as UserActiveModel, Column, Entity as Users, Model as User,
};
use crate::error::AppError;
use crate::jwt::{get_claims, require_admin, require_user, Claims};

pub async fn ensure_user_exists(
    db: &DatabaseConnection,
    config: &AppConfig,
    claims: &Claims,
) -> Result<User, DbErr> {
    // First, try to find user by external_id
    let existing_user = Users::find()
        .filter(Column::ExternalId.eq(&claims.sub))
        .one(db)
        .await?;

    match existing_user {
        Some(user) => Ok(user),
        None => {
            let is_admin = config.is_admin_email(&claims.email);
            let new_user = UserActiveModel {
                id: Set(Uuid::new_v4()),
                external_id: Set(claims.sub.clone()),
                email: Set(claims.email.clone()),
                name: Set(claims.name.clone()),
                is_active: Set(true),
                is_admin: Set(is_admin),
                created_at: Set(Utc::now().into()),
                updated_at: Set(Utc::now().into()),
            };

            let user = new_user.insert(db).await?;
            info!(user_id = %user.id, is_admin, "created user from token claims");
            Ok(user)
        }
    }
}

/// Active users, ordered by display name
pub async fn list_active_users(db: &DatabaseConnection) -> Result<Vec<User>, DbErr> {
    let mut users = Users::find()
        .filter(Column::IsActive.eq(true))
        .all(db)
        .await?;
    users.sort_by_key(|u| u.display_name().to_lowercase());
    Ok(users)
}

/// Flip a user's active flag, returning the updated row
pub async fn toggle_user_status(
    db: &DatabaseConnection,
    user_id: Uuid,
) -> Result<Option<User>, DbErr> {
    let Some(user) = Users::find_by_id(user_id).one(db).await? else {
        return Ok(None);
    };

    let is_active = !user.is_active;
    let mut user_model: UserActiveModel = user.into();
    user_model.is_active = Set(is_active);
    user_model.updated_at = Set(Utc::now().into());
    let updated = user_model.update(db).await?;
    Ok(Some(updated))
}

#[get("/me")]
pub async fn get_me(req: HttpRequest) -> Result<HttpResponse, AppError> {
    let user = require_user(&req)?;
    let claims = get_claims(&req);

    Ok(HttpResponse::Ok().json(json!({
        "user": UserSummary::from(&user),
        "token_info": claims.map(|c| json!({
            "sub": c.sub,
            "email": c.email,
            "issued_at": c.iat,
            "expires_at": c.exp
        }))
    })))
}

#[get("/users")]
pub async fn get_active_users(
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    require_user(&req)?;
    let users = list_active_users(&db).await?;
    let users: Vec<UserSummary> = users.iter().map(UserSummary::from).collect();
    Ok(HttpResponse::Ok().json(json!({ "users": users })))
}

#[get("/admin/users")]
pub async fn get_all_users(
    req: HttpRequest,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    require_admin(&req)?;
    let users = Users::find()
        .order_by_asc(Column::CreatedAt)
        .all(&**db)
        .await?;
    let users: Vec<UserSummary> = users.iter().map(UserSummary::from).collect();
    Ok(HttpResponse::Ok().json(json!({ "users": users })))
}

#[post("/admin/users/{user_id}/toggle")]
pub async fn toggle_user(
    req: HttpRequest,
    path: web::Path<Uuid>,
    db: web::Data<DatabaseConnection>,
) -> Result<HttpResponse, AppError> {
    let admin = require_admin(&req)?;
    let user_id = path.into_inner();

    if user_id == admin.id {
        return Err(AppError::bad_request(
            "CANNOT_TOGGLE_SELF",
            "Administrators cannot deactivate themselves",
        ));
    }

    let user = toggle_user_status(&db, user_id)
        .await?
        .ok_or_else(|| AppError::not_found("USER_NOT_FOUND", "User not found"))?;

    info!(admin_id = %admin.id, user_id = %user.id, is_active = user.is_active, "toggled user status");
    Ok(HttpResponse::Ok().json(json!({ "user": UserSummary::from(&user) })))
}
