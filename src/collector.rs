//! Per-service digest collection.
use crate::descriptor::ServiceDescriptor;
use crate::error::ProvenanceError;
use crate::resolver::DigestResolver;
use indexmap::IndexMap;

/// Service name to registry digest, in descriptor order.
pub type DigestMap = IndexMap<String, String>;

/// Resolve every service that declares an image.
///
/// Services without an image are skipped. The first resolution failure aborts
/// the collection and nothing collected so far is returned.
pub fn collect_image_digests<R>(
    descriptor: &ServiceDescriptor,
    resolver: &R,
) -> Result<DigestMap, ProvenanceError>
where
    R: DigestResolver + ?Sized,
{
    let mut digests = DigestMap::with_capacity(descriptor.len());
    for (name, service) in descriptor.iter() {
        let Some(image) = service.image_ref() else {
            tracing::debug!(service = name, "no image declared; skipping");
            continue;
        };
        let digest = resolver
            .resolve(image)
            .map_err(|error| ProvenanceError::Resolve {
                service: name.to_string(),
                error,
            })?;
        tracing::info!(service = name, image, digest = %digest, "resolved image digest");
        digests.insert(name.to_string(), digest);
    }
    Ok(digests)
}
