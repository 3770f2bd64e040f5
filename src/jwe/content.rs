//! Content encryption for `A256CBC-HS512` and `A256GCM`.
//!
//! Additional data is always the ASCII base64url protected header. Every
//! failure while opening collapses into [`TokenError::DecryptionFailed`].

use crate::algorithm::ContentAlgorithm;
use crate::error::TokenError;
use crate::kdf::DerivedKey;
use aes::Aes256;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Nonce};
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use rand::RngCore;
use ring::hmac;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

type Aes256CbcEnc = cbc::Encryptor<Aes256>;
type Aes256CbcDec = cbc::Decryptor<Aes256>;

/// Output of authenticated encryption.
#[derive(Debug, Clone)]
pub(crate) struct Sealed {
    pub iv: Vec<u8>,
    pub ciphertext: Vec<u8>,
    pub tag: Vec<u8>,
}

/// Encrypt `plaintext` under `key` with a fresh random IV.
pub(crate) fn seal(key: &DerivedKey, plaintext: &[u8], aad: &[u8]) -> Result<Sealed, TokenError> {
    let algorithm = key.algorithm();
    let mut iv = vec![0u8; algorithm.iv_len()];
    rand::thread_rng().fill_bytes(&mut iv);

    match algorithm {
        ContentAlgorithm::A256CbcHs512 => seal_cbc_hs512(key.as_bytes(), iv, plaintext, aad),
        ContentAlgorithm::A256Gcm => seal_gcm(key.as_bytes(), iv, plaintext, aad),
    }
}

/// Verify and decrypt. The key's algorithm selects the cipher.
pub(crate) fn open(
    key: &DerivedKey,
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
    aad: &[u8],
) -> Result<Zeroizing<Vec<u8>>, TokenError> {
    let algorithm = key.algorithm();
    if iv.len() != algorithm.iv_len() || tag.len() != algorithm.tag_len() {
        return Err(TokenError::DecryptionFailed);
    }

    let plaintext = match algorithm {
        ContentAlgorithm::A256CbcHs512 => open_cbc_hs512(key.as_bytes(), iv, ciphertext, tag, aad)?,
        ContentAlgorithm::A256Gcm => open_gcm(key.as_bytes(), iv, ciphertext, tag, aad)?,
    };
    Ok(Zeroizing::new(plaintext))
}

// RFC 7518 §5.2: MAC_KEY is the first half of the key, ENC_KEY the second,
// and the tag is the first half of HMAC(AAD || IV || C || AL).
fn cbc_tag(mac_key: &[u8], aad: &[u8], iv: &[u8], ciphertext: &[u8]) -> Vec<u8> {
    let al = ((aad.len() as u64) * 8).to_be_bytes();
    let key = hmac::Key::new(hmac::HMAC_SHA512, mac_key);
    let mut ctx = hmac::Context::with_key(&key);
    ctx.update(aad);
    ctx.update(iv);
    ctx.update(ciphertext);
    ctx.update(&al);
    let full = ctx.sign();
    full.as_ref()[..mac_key.len()].to_vec()
}

fn seal_cbc_hs512(key: &[u8], iv: Vec<u8>, plaintext: &[u8], aad: &[u8]) -> Result<Sealed, TokenError> {
    let (mac_key, enc_key) = key.split_at(key.len() / 2);
    let ciphertext = Aes256CbcEnc::new_from_slices(enc_key, &iv)
        .map_err(|_| TokenError::internal("Invalid AES-CBC key or IV length"))?
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext);
    let tag = cbc_tag(mac_key, aad, &iv, &ciphertext);
    Ok(Sealed { iv, ciphertext, tag })
}

fn open_cbc_hs512(
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, TokenError> {
    let (mac_key, enc_key) = key.split_at(key.len() / 2);
    let expected = cbc_tag(mac_key, aad, iv, ciphertext);
    if !bool::from(expected.ct_eq(tag)) {
        return Err(TokenError::DecryptionFailed);
    }

    Aes256CbcDec::new_from_slices(enc_key, iv)
        .map_err(|_| TokenError::DecryptionFailed)?
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| TokenError::DecryptionFailed)
}

fn seal_gcm(key: &[u8], iv: Vec<u8>, plaintext: &[u8], aad: &[u8]) -> Result<Sealed, TokenError> {
    let cipher = Aes256Gcm::new_from_slice(key)
        .map_err(|_| TokenError::internal("Invalid AES-GCM key length"))?;
    let mut output = cipher
        .encrypt(Nonce::from_slice(&iv), Payload { msg: plaintext, aad })
        .map_err(|_| TokenError::internal("AES-GCM encryption failed"))?;

    // Split ciphertext and tag (last 16 bytes is tag)
    let tag = output.split_off(output.len() - ContentAlgorithm::A256Gcm.tag_len());
    Ok(Sealed {
        iv,
        ciphertext: output,
        tag,
    })
}

fn open_gcm(
    key: &[u8],
    iv: &[u8],
    ciphertext: &[u8],
    tag: &[u8],
    aad: &[u8],
) -> Result<Vec<u8>, TokenError> {
    let cipher = Aes256Gcm::new_from_slice(key).map_err(|_| TokenError::DecryptionFailed)?;

    let mut ciphertext_with_tag = Vec::with_capacity(ciphertext.len() + tag.len());
    ciphertext_with_tag.extend_from_slice(ciphertext);
    ciphertext_with_tag.extend_from_slice(tag);

    cipher
        .decrypt(
            Nonce::from_slice(iv),
            Payload {
                msg: &ciphertext_with_tag,
                aad,
            },
        )
        .map_err(|_| TokenError::DecryptionFailed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kdf::derive_for;
    use crate::secret::Secret;

    fn key(algorithm: ContentAlgorithm) -> DerivedKey {
        derive_for(algorithm, &Secret::from("content-secret"), "salt").unwrap()
    }

    #[test]
    fn test_cbc_seal_open() {
        let key = key(ContentAlgorithm::A256CbcHs512);
        let sealed = seal(&key, b"{\"a\":1}", b"aad").unwrap();
        assert_eq!(sealed.iv.len(), 16);
        assert_eq!(sealed.tag.len(), 32);
        assert_eq!(sealed.ciphertext.len() % 16, 0);

        let plaintext = open(&key, &sealed.iv, &sealed.ciphertext, &sealed.tag, b"aad").unwrap();
        assert_eq!(plaintext.as_slice(), b"{\"a\":1}");
    }

    #[test]
    fn test_gcm_seal_open() {
        let key = key(ContentAlgorithm::A256Gcm);
        let sealed = seal(&key, b"hello", b"aad").unwrap();
        assert_eq!(sealed.iv.len(), 12);
        assert_eq!(sealed.tag.len(), 16);
        assert_eq!(sealed.ciphertext.len(), 5);

        let plaintext = open(&key, &sealed.iv, &sealed.ciphertext, &sealed.tag, b"aad").unwrap();
        assert_eq!(plaintext.as_slice(), b"hello");
    }

    #[test]
    fn test_fresh_iv_per_seal() {
        let key = key(ContentAlgorithm::A256CbcHs512);
        let a = seal(&key, b"same", b"aad").unwrap();
        let b = seal(&key, b"same", b"aad").unwrap();
        assert_ne!(a.iv, b.iv);
        assert_ne!(a.ciphertext, b.ciphertext);
    }

    #[test]
    fn test_aad_is_authenticated() {
        for algorithm in [ContentAlgorithm::A256CbcHs512, ContentAlgorithm::A256Gcm] {
            let key = key(algorithm);
            let sealed = seal(&key, b"payload", b"header-a").unwrap();
            let result = open(&key, &sealed.iv, &sealed.ciphertext, &sealed.tag, b"header-b");
            assert!(matches!(result, Err(TokenError::DecryptionFailed)));
        }
    }

    #[test]
    fn test_wrong_key_and_tamper_are_indistinguishable() {
        let key_a = key(ContentAlgorithm::A256CbcHs512);
        let key_b = derive_for(ContentAlgorithm::A256CbcHs512, &Secret::from("other"), "salt").unwrap();
        let sealed = seal(&key_a, b"payload", b"aad").unwrap();

        let wrong_key = open(&key_b, &sealed.iv, &sealed.ciphertext, &sealed.tag, b"aad").unwrap_err();
        let mut tampered = sealed.ciphertext.clone();
        tampered[0] ^= 1;
        let tampered = open(&key_a, &sealed.iv, &tampered, &sealed.tag, b"aad").unwrap_err();

        assert_eq!(wrong_key.to_string(), tampered.to_string());
        assert_eq!(wrong_key.code(), tampered.code());
    }

    #[test]
    fn test_bad_lengths_rejected() {
        let key = key(ContentAlgorithm::A256Gcm);
        let sealed = seal(&key, b"payload", b"aad").unwrap();
        let short_iv = open(&key, &sealed.iv[..8], &sealed.ciphertext, &sealed.tag, b"aad");
        assert!(matches!(short_iv, Err(TokenError::DecryptionFailed)));
        let short_tag = open(&key, &sealed.iv, &sealed.ciphertext, &sealed.tag[..8], b"aad");
        assert!(matches!(short_tag, Err(TokenError::DecryptionFailed)));
    }
}
