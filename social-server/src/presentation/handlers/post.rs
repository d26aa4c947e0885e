use actix_multipart::form::MultipartForm;
use actix_web::{HttpRequest, HttpResponse, web};
use tracing::{debug, info};
use uuid::Uuid;

use crate::application::comment_service::CommentService;
use crate::application::post_service::{EditAccess, EditOutcome, PostService};
use crate::domain::error::DomainError;
use crate::domain::post::PostView;
use crate::domain::validation::FormErrors;
use crate::presentation::dto::{
    CommentForm, CommentFormView, CommentPageResponse, GroupChoice, PostFormResponse,
    PostFormView, PostItem,
};
use crate::presentation::forms::PostForm;
use crate::presentation::utils::{AuthenticatedUser, post_url, redirect, request_id};

async fn render_form(
    posts: &PostService,
    form: PostFormView,
    post: Option<PostView>,
) -> Result<HttpResponse, DomainError> {
    let groups = posts
        .group_choices()
        .await?
        .into_iter()
        .map(GroupChoice::from)
        .collect();

    Ok(HttpResponse::Ok().json(PostFormResponse {
        form,
        groups,
        post_edit: post.is_some(),
        post: post.map(PostItem::from),
    }))
}

pub async fn new_post_form(posts: web::Data<PostService>) -> Result<HttpResponse, DomainError> {
    render_form(&posts, PostFormView::default(), None).await
}

pub async fn create_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    MultipartForm(form): MultipartForm<PostForm>,
) -> Result<HttpResponse, DomainError> {
    let (text, group) = form.echo();
    match posts.create_post(user.id, form.into_input()).await {
        Ok(post) => {
            info!(
                request_id = %request_id(&req),
                username = %user.username,
                post_id = %post.id,
                "post created"
            );
            Ok(redirect("/"))
        }
        Err(DomainError::Validation(errors)) => {
            debug!(username = %user.username, errors = %errors, "post form rejected");
            let form = PostFormView {
                text,
                group,
                image: None,
                errors,
            };
            render_form(&posts, form, None).await
        }
        Err(err) => Err(err),
    }
}

pub async fn edit_form(
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<(String, Uuid)>,
) -> Result<HttpResponse, DomainError> {
    let (username, post_id) = path.into_inner();
    match posts.edit_access(&username, post_id, user.id).await? {
        EditAccess::NotAuthor => Ok(redirect(&post_url(&username, post_id))),
        EditAccess::Author(post) => {
            let form = PostFormView {
                text: post.text.clone(),
                group: post.group.as_ref().map(|g| g.id.to_string()),
                image: post.image.clone(),
                errors: FormErrors::new(),
            };
            render_form(&posts, form, Some(post)).await
        }
    }
}

pub async fn post_edit(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<(String, Uuid)>,
    MultipartForm(form): MultipartForm<PostForm>,
) -> Result<HttpResponse, DomainError> {
    let (username, post_id) = path.into_inner();
    let detail = post_url(&username, post_id);

    let (text, group) = form.echo();

    match posts
        .edit_post(&username, post_id, user.id, form.into_input())
        .await
    {
        Ok(EditOutcome::Updated(post)) => {
            info!(
                request_id = %request_id(&req),
                username = %user.username,
                post_id = %post.id,
                "post updated"
            );
            Ok(redirect(&detail))
        }
        Ok(EditOutcome::NotAuthor) => Ok(redirect(&detail)),
        Err(DomainError::Validation(errors)) => {
            let post = match posts.edit_access(&username, post_id, user.id).await? {
                EditAccess::Author(post) => post,
                EditAccess::NotAuthor => return Ok(redirect(&detail)),
            };
            let form = PostFormView {
                text,
                group,
                image: post.image.clone(),
                errors,
            };
            render_form(&posts, form, Some(post)).await
        }
        Err(err) => Err(err),
    }
}

pub async fn add_comment(
    req: HttpRequest,
    user: AuthenticatedUser,
    comments: web::Data<CommentService>,
    path: web::Path<(String, Uuid)>,
    form: web::Form<CommentForm>,
) -> Result<HttpResponse, DomainError> {
    let (username, post_id) = path.into_inner();
    let text = form.into_inner().text;

    match comments
        .add_comment(&username, post_id, user.id, text.as_deref())
        .await
    {
        Ok(comment) => {
            info!(
                request_id = %request_id(&req),
                username = %user.username,
                comment_id = %comment.id,
                post_id = %post_id,
                "comment added"
            );
            Ok(redirect(&post_url(&username, post_id)))
        }
        Err(DomainError::Validation(errors)) => {
            let (post, existing) = comments.thread(&username, post_id).await?;
            Ok(HttpResponse::Ok().json(CommentPageResponse {
                post: PostItem::from(post),
                comments: existing,
                comment_form: CommentFormView {
                    text: text.unwrap_or_default(),
                    errors,
                },
            }))
        }
        Err(err) => Err(err),
    }
}
