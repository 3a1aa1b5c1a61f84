use async_trait::async_trait;
use futures::stream::TryStreamExt;
use validator::Validate;
use wither::Model as WitherModel;
use wither::bson::Document;
use wither::bson::doc;
use wither::bson::oid::ObjectId;
use wither::mongodb::Database;
use wither::mongodb::options::FindOneAndUpdateOptions;
use wither::mongodb::options::FindOneOptions;
use wither::mongodb::options::FindOptions;
use wither::mongodb::options::ReturnDocument;
use wither::mongodb::options::UpdateOptions;
use wither::mongodb::results::DeleteResult;
use wither::mongodb::results::UpdateResult;

use crate::errors::Error;

// This is the Model trait. All models that have a MongoDB collection should
// implement this and therefore inherit theses methods.
#[async_trait]
pub trait ModelExt
where
    Self: WitherModel + Validate,
{
    async fn get_connection() -> &'static Database;

    async fn create(mut model: Self) -> Result<Self, Error> {
        let connection = Self::get_connection().await;
        model
            .validate()
            .map_err(|e| Error::bad_request(&format!("Validation db error: {e:?}")))?;
        model.save(connection, None).await.map_err(Error::Wither)?;

        Ok(model)
    }

    async fn find_by_id(id: &ObjectId) -> Result<Option<Self>, Error> {
        let connection = Self::get_connection().await;
        <Self as WitherModel>::find_one(connection, doc! { "_id": id }, None)
            .await
            .map_err(Error::Wither)
    }

    async fn find_one<O>(query: Document, options: O) -> Result<Option<Self>, Error>
    where
        O: Into<Option<FindOneOptions>> + Send,
    {
        let connection = Self::get_connection().await;
        <Self as WitherModel>::find_one(connection, query, options)
            .await
            .map_err(Error::Wither)
    }

    async fn find<O>(query: Document, options: O) -> Result<Vec<Self>, Error>
    where
        O: Into<Option<FindOptions>> + Send,
    {
        let connection = Self::get_connection().await;
        <Self as WitherModel>::find(connection, query, options)
            .await
            .map_err(Error::Wither)?
            .try_collect::<Vec<Self>>()
            .await
            .map_err(Error::Wither)
    }

    async fn find_and_count<O>(query: Document, options: O) -> Result<(Vec<Self>, u64), Error>
    where
        O: Into<Option<FindOptions>> + Send,
    {
        let connection = Self::get_connection().await;

        let count = Self::collection(connection)
            .count_documents(query.clone())
            .await
            .map_err(Error::Mongo)?;

        let items = <Self as WitherModel>::find(connection, query, options.into())
            .await
            .map_err(Error::Wither)?
            .try_collect::<Vec<Self>>()
            .await
            .map_err(Error::Wither)?;

        Ok((items, count))
    }

    async fn find_one_and_update(
        query: Document,
        update: Document,
        upsert: bool,
    ) -> Result<Option<Self>, Error> {
        let connection = Self::get_connection().await;
        let options = FindOneAndUpdateOptions::builder()
            .upsert(upsert)
            .return_document(ReturnDocument::After)
            .build();

        <Self as WitherModel>::find_one_and_update(connection, query, update, options)
            .await
            .map_err(Error::Wither)
    }

    async fn update_one<O>(
        query: Document,
        update: Document,
        options: O,
    ) -> Result<UpdateResult, Error>
    where
        O: Into<Option<UpdateOptions>> + Send,
    {
        let connection = Self::get_connection().await;
        Self::collection(connection)
            .update_one(query, update)
            .with_options(options)
            .await
            .map_err(Error::Mongo)
    }

    async fn update_many<O>(
        query: Document,
        update: Document,
        options: O,
    ) -> Result<UpdateResult, Error>
    where
        O: Into<Option<UpdateOptions>> + Send,
    {
        let connection = Self::get_connection().await;
        Self::collection(connection)
            .update_many(query, update)
            .with_options(options)
            .await
            .map_err(Error::Mongo)
    }

    async fn delete_many(query: Document) -> Result<DeleteResult, Error> {
        let connection = Self::get_connection().await;
        <Self as WitherModel>::delete_many(connection, query, None)
            .await
            .map_err(Error::Wither)
    }

    async fn delete_one(query: Document) -> Result<DeleteResult, Error> {
        let connection = Self::get_connection().await;
        Self::collection(connection)
            .delete_one(query)
            .await
            .map_err(Error::Mongo)
    }

    async fn count(query: Document) -> Result<u64, Error> {
        let connection = Self::get_connection().await;
        Self::collection(connection)
            .count_documents(query)
            .await
            .map_err(Error::Mongo)
    }

    async fn exists(query: Document) -> Result<bool, Error> {
        let connection = Self::get_connection().await;
        let count = Self::collection(connection)
            .count_documents(query)
            .await
            .map_err(Error::Mongo)?;

        Ok(count > 0)
    }
}
