use async_graphql::{Context, Object, SimpleObject, Upload};

use super::super::http::RequestContext;
use super::super::types::TypeRegistry;

// Root object for GraphQL queries
pub struct QueryRoot;

#[Object]
impl QueryRoot {
    // Greets the caller, by name when one is given
    async fn hello(&self, name: Option<String>) -> String {
        format!("Hello, {}!", name.as_deref().unwrap_or("world"))
    }

    // Header value from the HTTP request that carried this operation
    async fn header(&self, ctx: &Context<'_>, name: String) -> Option<String> {
        ctx.data_opt::<RequestContext>()
            .and_then(|request| request.header(&name))
            .map(str::to_string)
    }

    // SDL of the registered type definitions
    async fn sdl(&self, ctx: &Context<'_>) -> async_graphql::Result<String> {
        Ok(ctx.data::<TypeRegistry>()?.print_sdl())
    }

    // Federation service description; the gateway reads the SDL from here
    #[graphql(name = "_service")]
    async fn service(&self, ctx: &Context<'_>) -> async_graphql::Result<FederationService> {
        Ok(FederationService {
            sdl: ctx.data::<TypeRegistry>()?.print_sdl(),
        })
    }

    // Names of registered types implementing the given interface
    async fn implementors(&self, ctx: &Context<'_>, interface: String) -> async_graphql::Result<Vec<String>> {
        let registry = ctx.data::<TypeRegistry>()?;
        let interface = registry
            .get(&interface)
            .filter(|definition| definition.is_interface())
            .ok_or_else(|| format!("Unknown interface '{}'", interface))?;
        Ok(registry.implementors(interface).map(|t| t.name().to_string()).collect())
    }
}

#[derive(Debug, SimpleObject)]
#[graphql(name = "_Service")]
pub struct FederationService {
    pub sdl: String,
}

#[derive(Debug, SimpleObject)]
pub struct FileInfo {
    pub filename: String,
    pub content_type: Option<String>,
    pub size: u64,
}

// Root object for GraphQL mutations
pub struct MutationRoot;

#[Object]
impl MutationRoot {
    // Describes an uploaded file without keeping it
    async fn read_file(&self, ctx: &Context<'_>, file: Upload) -> async_graphql::Result<FileInfo> {
        let value = file.value(ctx)?;
        Ok(FileInfo {
            size: value.size()?,
            filename: value.filename,
            content_type: value.content_type,
        })
    }

    // Describes several uploaded files, in order
    async fn read_files(&self, ctx: &Context<'_>, files: Vec<Upload>) -> async_graphql::Result<Vec<FileInfo>> {
        let mut infos = Vec::with_capacity(files.len());
        for file in files {
            infos.push(self.read_file(ctx, file).await?);
        }
        Ok(infos)
    }
}
